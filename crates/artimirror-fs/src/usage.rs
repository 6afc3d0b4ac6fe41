use std::fmt;
use std::path::Path;

use walkdir::WalkDir;

/// Total size and file count of a directory tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DirUsage {
    pub bytes: u64,
    pub files: u64,
}

impl fmt::Display for DirUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {} files", format_size(self.bytes), self.files)
    }
}

/// Sum the sizes of all regular files below `root`.
///
/// A missing root yields an empty usage. Entries that cannot be inspected are logged
/// and left out of the totals.
pub fn dir_usage(root: impl AsRef<Path>) -> DirUsage {
    let root = root.as_ref();
    let mut usage = DirUsage::default();
    if !root.exists() {
        return usage;
    }

    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(%err, "skipping unreadable entry while measuring usage");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        match entry.metadata() {
            Ok(meta) => {
                usage.bytes += meta.len();
                usage.files += 1;
            }
            Err(err) => {
                tracing::warn!(path = %entry.path().display(), %err, "could not read file size")
            }
        }
    }

    usage
}

/// Render a byte count with two decimals in the largest unit below 1024.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    let mut size = bytes as f64;
    for unit in UNITS {
        if size < 1024.0 {
            return format!("{size:.2} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.2} PB")
}
