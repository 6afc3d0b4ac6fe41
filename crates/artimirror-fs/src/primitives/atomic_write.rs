use crate::{Error, Result};
use std::fs;
use std::path::Path;

#[derive(Clone, Copy, Debug, Default)]
pub struct AtomicWriteOptions {
    pub sync: bool,
}

impl AtomicWriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }
}

/// Write `content` next to `path` under a hidden temporary name, then rename it into place.
///
/// Readers observe either the previous file or the complete new one.
pub fn atomic_write(
    path: impl AsRef<Path>,
    content: &[u8],
    options: AtomicWriteOptions,
) -> Result<()> {
    let path = path.as_ref();
    let parent = path
        .parent()
        .ok_or_else(|| Error::NoParent(path.to_path_buf()))?;
    let file_name = path.file_name().unwrap_or_default().to_string_lossy();
    let tmp_path = parent.join(format!(".{file_name}.tmp"));

    fs::write(&tmp_path, content).map_err(|e| Error::Write {
        path:   tmp_path.clone(),
        source: e,
    })?;

    if options.sync {
        let file = fs::File::open(&tmp_path).map_err(|e| Error::Write {
            path:   tmp_path.clone(),
            source: e,
        })?;
        file.sync_all().map_err(|e| Error::Write {
            path:   tmp_path.clone(),
            source: e,
        })?;
    }

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        Error::Rename {
            from:   tmp_path.clone(),
            to:     path.to_path_buf(),
            source: e,
        }
    })
}

/// Move a fully written file onto its final name with a single rename.
///
/// `from` and `to` must live on the same filesystem; callers keep the staging file
/// next to the target so this holds.
pub fn promote(from: impl AsRef<Path>, to: impl AsRef<Path>) -> Result<()> {
    let (from, to) = (from.as_ref(), to.as_ref());
    fs::rename(from, to).map_err(|e| Error::Rename {
        from:   from.to_path_buf(),
        to:     to.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("checksums.json");
        atomic_write(&path, b"hello world", AtomicWriteOptions::new()).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"hello world");
        assert!(!dir.path().join(".checksums.json.tmp").exists());
    }

    #[test]
    fn test_atomic_write_replaces_existing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("record");
        fs::write(&path, "old").unwrap();
        atomic_write(&path, b"new", AtomicWriteOptions::new().sync(true)).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"new");
    }

    #[test]
    fn test_promote_moves_file() {
        let dir = tempdir().unwrap();
        let part = dir.path().join("a.zip.part");
        let target = dir.path().join("a.zip");
        fs::write(&part, "payload").unwrap();

        promote(&part, &target).unwrap();

        assert!(!part.exists());
        assert_eq!(fs::read(&target).unwrap(), b"payload");
    }

    #[test]
    fn test_promote_missing_source() {
        let dir = tempdir().unwrap();
        let err = promote(dir.path().join("nope"), dir.path().join("dest")).unwrap_err();
        assert!(matches!(err, Error::Rename { .. }));
    }
}
