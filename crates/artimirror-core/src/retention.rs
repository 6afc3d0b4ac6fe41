//! Age-based pruning of the local mirror.
//!
//! Every file is judged by the retention of the directory it lives in: the override rule
//! whose path is the longest whole-segment prefix of that directory, else the global
//! default. Checksum records and download history play no part.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use walkdir::WalkDir;

use crate::config::{RetentionRule, SyncConfig};

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub files_deleted: usize,
    pub dirs_removed:  usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionPolicy {
    global_keep_days: u32,
    /// Normalized rule paths in declaration order.
    rules:            Vec<(PathBuf, u32)>,
}

impl RetentionPolicy {
    pub fn new(global_keep_days: u32, rules: &[RetentionRule]) -> Self {
        Self {
            global_keep_days,
            rules: rules
                .iter()
                .map(|rule| (normalize_rule_path(&rule.relative_path), rule.keep_days))
                .collect(),
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(config.global_keep_days, &config.folder_retention)
    }

    /// Days to keep files in `dir`, given relative to the pruned root.
    ///
    /// `Path::starts_with` compares whole components, so `a/b` governs `a/b/c` but not
    /// `a/bc`. On equal length the first declared rule wins.
    pub fn keep_days_for(&self, dir: &Path) -> u32 {
        let mut best: Option<(usize, u32)> = None;
        for (path, days) in &self.rules {
            if !dir.starts_with(path) {
                continue;
            }
            let depth = path.components().count();
            if best.is_none_or(|(d, _)| depth > d) {
                best = Some((depth, *days));
            }
        }
        best.map_or(self.global_keep_days, |(_, days)| days)
    }
}

/// Backslashes become separators; empty, `.` and surrounding slashes vanish. An empty
/// result names the root itself.
fn normalize_rule_path(raw: &str) -> PathBuf {
    raw.replace('\\', "/")
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect()
}

/// Prune `root` against the current time.
pub fn prune(root: &Path, policy: &RetentionPolicy) -> PruneReport {
    prune_at(root, policy, SystemTime::now())
}

/// Delete every file under `root` older than its directory's retention at `now`, then
/// remove the directories this left empty. `root` itself is never removed.
///
/// Best effort throughout: unreadable entries and failed deletions are logged and
/// skipped. A missing root yields an empty report.
pub fn prune_at(root: &Path, policy: &RetentionPolicy, now: SystemTime) -> PruneReport {
    let mut report = PruneReport::default();
    if !root.is_dir() {
        tracing::debug!(root = %root.display(), "nothing to prune");
        return report;
    }

    // Collected first so deletions do not disturb the walk.
    let files: Vec<PathBuf> = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .collect();

    for file in files {
        let Some(dir) = file.parent() else { continue };
        let relative = dir.strip_prefix(root).unwrap_or(Path::new(""));
        let keep_days = policy.keep_days_for(relative);

        let modified = match std::fs::metadata(&file).and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(e) => {
                tracing::warn!(path = %file.display(), error = %e, "cannot read modification time");
                continue;
            }
        };
        // Modification times in the future count as age zero.
        let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
        if age <= Duration::from_secs(u64::from(keep_days) * SECONDS_PER_DAY) {
            continue;
        }

        match std::fs::remove_file(&file) {
            Ok(()) => {
                tracing::info!(
                    path = %file.display(),
                    age_days = age.as_secs() / SECONDS_PER_DAY,
                    keep_days,
                    "deleted expired file"
                );
                report.files_deleted += 1;
                report.dirs_removed += artimirror_fs::remove_empty_ancestors(dir, root);
            }
            Err(e) => tracing::warn!(path = %file.display(), error = %e, "could not delete expired file"),
        }
    }

    report
}
