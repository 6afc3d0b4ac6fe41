//! Per-directory `checksums.json` records.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use artimirror_fs::{AtomicWriteOptions, atomic_write};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TransactionError;

pub const CHECKSUM_FILE: &str = "checksums.json";

/// Verified SHA-256 digests of the files in one directory.
///
/// Top-level keys other than `sha256` are carried through a rewrite untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChecksumRecord {
    #[serde(default)]
    pub sha256: BTreeMap<String, String>,
    #[serde(flatten)]
    pub extra:  BTreeMap<String, Value>,
}

impl ChecksumRecord {
    pub fn path_in(dir: &Path) -> PathBuf { dir.join(CHECKSUM_FILE) }

    /// Load the record of `dir`. A missing file is an empty record; so is an unreadable
    /// or malformed one, with a warning.
    pub fn load(dir: &Path) -> Self {
        let path = Self::path_in(dir);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read checksum record, starting empty");
                return Self::default();
            }
        };

        serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "corrupt checksum record, starting empty");
            Self::default()
        })
    }

    pub fn save(&self, dir: &Path) -> Result<(), TransactionError> {
        let mut content = serde_json::to_vec_pretty(self)?;
        content.push(b'\n');
        atomic_write(Self::path_in(dir), &content, AtomicWriteOptions::new().sync(true))?;
        Ok(())
    }

    pub fn insert(&mut self, name: impl Into<String>, checksum: impl Into<String>) {
        self.sha256.insert(name.into(), checksum.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> { self.sha256.get(name).map(String::as_str) }
}

/// Serializes read-modify-write cycles on checksum records for one run.
///
/// Clones share the same lock, so any number of concurrent transactions can record
/// into the same directory without losing entries.
#[derive(Debug, Clone, Default)]
pub struct ChecksumLedger {
    lock: Arc<Mutex<()>>,
}

impl ChecksumLedger {
    pub fn new() -> Self { Self::default() }

    /// Merge `name -> checksum` into the record of `dir`.
    pub async fn record(
        &self,
        dir: PathBuf,
        name: String,
        checksum: String,
    ) -> Result<(), TransactionError> {
        let lock = Arc::clone(&self.lock);
        tokio::task::spawn_blocking(move || {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            merge_entry(&dir, name, checksum)
        })
        .await?
    }
}

/// Load, insert and write back without any locking.
pub fn merge_entry(dir: &Path, name: String, checksum: String) -> Result<(), TransactionError> {
    let mut record = ChecksumRecord::load(dir);
    record.insert(name, checksum);
    record.save(dir)
}
