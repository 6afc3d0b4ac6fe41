use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path:   PathBuf,
        source: std::io::Error,
    },

    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        path:   PathBuf,
        source: std::io::Error,
    },

    #[error("failed to rename {} to {}: {source}", from.display(), to.display())]
    Rename {
        from:   PathBuf,
        to:     PathBuf,
        source: std::io::Error,
    },

    #[error("failed to remove {}: {source}", path.display())]
    Remove {
        path:   PathBuf,
        source: std::io::Error,
    },

    #[error("path has no parent directory: {}", .0.display())]
    NoParent(PathBuf),
}

pub type Result<T> = std::result::Result<T, Error>;
