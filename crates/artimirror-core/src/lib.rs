//! Artifact synchronization engine.
//!
//! A run locates recent artifacts on the remote repository, downloads each one into a
//! `.part` file, verifies its SHA-256, promotes it with a single rename and records the
//! digest in the directory's `checksums.json`. Retention then prunes the local mirror by
//! file age.
//!
//! - [`Locator`]: search query construction and result filtering
//! - [`DownloadTransaction`]: one artifact from request to promotion
//! - [`SyncEngine`]: ordering, bounded concurrency, report
//! - [`prune`]: age-based retention with per-directory overrides
//!
//! The engine only emits `tracing` events; installing a subscriber is up to the caller.

mod checksums;
mod config;
mod credential;
mod descriptor;
mod error;
mod locator;
mod orchestrator;
mod retention;
mod transaction;
mod wildcard;

#[cfg(test)]
mod test_support;

pub use checksums::{CHECKSUM_FILE, ChecksumLedger, ChecksumRecord, merge_entry};
pub use config::{MismatchPolicy, QueryAuth, RetentionRule, SyncConfig};
pub use credential::{API_KEY_HEADER, ApiCredential};
pub use descriptor::{ArtifactDescriptor, download_url, normalize_path};
pub use error::{ConfigError, QueryError, Result, SyncError, TransactionError};
pub use locator::{
    CREATED_FORMAT, CandidateFilter, INCLUDED_FIELDS, Locator, RawArtifact, SearchResults, locate,
};
pub use orchestrator::{SyncEngine, SyncReport, run};
pub use retention::{PruneReport, RetentionPolicy, prune, prune_at};
pub use transaction::{DownloadOutcome, DownloadTransaction, MISMATCH_SUFFIX, PART_SUFFIX};

pub use artimirror_fetch::{HttpClient, ReqwestClient};
pub use artimirror_fs::DirUsage;
