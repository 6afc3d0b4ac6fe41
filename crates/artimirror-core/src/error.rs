use std::path::PathBuf;

use artimirror_fetch::FetchError;
use artimirror_verify::VerificationError;
use thiserror::Error;

/// Configuration could not be loaded or is unusable. Fatal before a run starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path:   PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Discovery failed. Fatal to the run: nothing can be synchronized without a result set.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("search request failed: {0}")]
    Transport(#[source] FetchError),

    #[error("search returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected search response: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("cannot build URL from base {0}")]
    Url(String),
}

/// Cause attached to a per-artifact transient failure.
#[derive(Debug, Error)]
pub enum TransactionError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Fs(#[from] artimirror_fs::Error),

    #[error(transparent)]
    Verify(#[from] VerificationError),

    #[error("failed to encode checksum record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Run-fatal errors surfaced by the orchestrator.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Client(#[from] FetchError),

    #[error("retention task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T, E = SyncError> = std::result::Result<T, E>;
