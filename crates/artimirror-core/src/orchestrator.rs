//! One synchronization run: discover, download, prune, report.

use std::fmt;

use artimirror_fetch::{Fetcher, HttpClient, ReqwestClient, Timeouts};
use artimirror_fs::{DirUsage, dir_usage, format_size};
use futures_util::{StreamExt, stream};
use tokio::time::Instant;

use crate::checksums::ChecksumLedger;
use crate::config::SyncConfig;
use crate::credential::ApiCredential;
use crate::error::{ConfigError, Result};
use crate::locator::Locator;
use crate::retention::{PruneReport, RetentionPolicy, prune};
use crate::transaction::{DownloadOutcome, DownloadTransaction};

/// Aggregate result of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub found:      usize,
    pub saved:      usize,
    pub skipped:    usize,
    pub mismatched: usize,
    pub failed:     usize,
    /// Not started because the run deadline had passed.
    pub deferred:   usize,
    pub retention:  PruneReport,
    pub usage:      DirUsage,
}

impl SyncReport {
    fn count(&mut self, outcome: Option<&DownloadOutcome>) {
        match outcome {
            Some(DownloadOutcome::Saved { .. }) => self.saved += 1,
            Some(DownloadOutcome::Skipped) => self.skipped += 1,
            Some(DownloadOutcome::ChecksumMismatch { .. }) => self.mismatched += 1,
            Some(DownloadOutcome::TransientFailure(_)) => self.failed += 1,
            None => self.deferred += 1,
        }
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "found {}, saved {}, skipped {}, mismatched {}, failed {}",
            self.found, self.saved, self.skipped, self.mismatched, self.failed
        )?;
        if self.deferred > 0 {
            write!(f, ", deferred {}", self.deferred)?;
        }
        Ok(())
    }
}

pub struct SyncEngine<C: HttpClient> {
    config:     SyncConfig,
    credential: ApiCredential,
    locator:    Locator,
    fetcher:    Fetcher<C>,
    ledger:     ChecksumLedger,
    retention:  RetentionPolicy,
}

impl SyncEngine<ReqwestClient> {
    /// Engine talking to the configured server over HTTP.
    pub fn from_config(config: SyncConfig, credential: ApiCredential) -> Result<Self> {
        let client = ReqwestClient::new(Timeouts::uniform(config.request_timeout()))?;
        Ok(Self::new(client, config, credential)?)
    }
}

impl<C: HttpClient> SyncEngine<C> {
    pub fn new(client: C, config: SyncConfig, credential: ApiCredential) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            locator: Locator::new(&config)?,
            retention: RetentionPolicy::from_config(&config),
            fetcher: Fetcher::new(client),
            ledger: ChecksumLedger::new(),
            config,
            credential,
        })
    }

    pub fn client(&self) -> &C { self.fetcher.client() }

    pub fn config(&self) -> &SyncConfig { &self.config }

    /// Run one synchronization pass.
    ///
    /// Only a failed search aborts the run. Individual downloads end up as counts in the
    /// report, and retention runs after every started download has finished.
    pub async fn run(&self) -> Result<SyncReport> {
        let mut descriptors = self.locator.locate(self.client(), &self.credential).await?;
        let mut report = SyncReport {
            found: descriptors.len(),
            ..SyncReport::default()
        };
        tracing::info!(found = report.found, repo = %self.config.repo, "artifacts located");
        if descriptors.is_empty() {
            return Ok(report);
        }

        descriptors.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let deadline = self.config.run_timeout().map(|timeout| Instant::now() + timeout);
        let transaction = DownloadTransaction::new(
            &self.fetcher,
            &self.ledger,
            &self.credential,
            self.config.on_mismatch,
        );
        let transaction = &transaction;
        let root = self.config.download_root.as_path();

        let mut outcomes = stream::iter(&descriptors)
            .map(|descriptor| async move {
                // Checked on first poll, which is when the download would start.
                if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                    tracing::warn!(artifact = %descriptor.remote_path(), "run deadline passed, deferring");
                    return None;
                }
                Some(transaction.download(descriptor, root).await)
            })
            .buffer_unordered(self.config.max_concurrent_downloads);

        while let Some(outcome) = outcomes.next().await {
            report.count(outcome.as_ref());
        }
        drop(outcomes);

        let repo_root = self.config.repo_root();
        let policy = self.retention.clone();
        let (retention, usage) = tokio::task::spawn_blocking(move || {
            let retention = prune(&repo_root, &policy);
            (retention, dir_usage(&repo_root))
        })
        .await?;
        report.retention = retention;
        report.usage = usage;

        tracing::info!(
            files_deleted = retention.files_deleted,
            dirs_removed = retention.dirs_removed,
            "retention applied"
        );
        tracing::info!(size = %format_size(usage.bytes), files = usage.files, "mirror usage");
        tracing::info!(%report, "sync finished");

        Ok(report)
    }
}

/// Build an HTTP engine for `config` and run it once.
pub async fn run(config: SyncConfig, credential: ApiCredential) -> Result<SyncReport> {
    SyncEngine::from_config(config, credential)?.run().await
}
