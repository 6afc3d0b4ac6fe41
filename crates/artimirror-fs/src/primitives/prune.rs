use crate::{Error, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Remove `path` if it is present. Returns whether a file was removed.
pub fn remove_file_if_exists(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::Remove {
            path:   path.to_path_buf(),
            source: e,
        }),
    }
}

/// Remove `start` and each of its ancestors while they are empty, stopping at the first
/// non-empty directory or at `stop_at`, which is never removed.
///
/// Best effort: any failure to list or remove a directory ends the climb silently.
/// Returns the number of directories removed.
pub fn remove_empty_ancestors(start: impl AsRef<Path>, stop_at: impl AsRef<Path>) -> usize {
    let stop_at = stop_at.as_ref();
    let mut removed = 0;
    let mut current = Some(start.as_ref());

    while let Some(dir) = current {
        if dir == stop_at || !dir.starts_with(stop_at) {
            break;
        }

        let empty = match fs::read_dir(dir) {
            Ok(mut entries) => entries.next().is_none(),
            Err(_) => break,
        };
        if !empty || fs::remove_dir(dir).is_err() {
            break;
        }

        tracing::info!(dir = %dir.display(), "removed empty directory");
        removed += 1;
        current = dir.parent();
    }

    removed
}
