//! Download, verify and place a single artifact.

use std::path::{Path, PathBuf};

use artimirror_fetch::{FetchOptions, Fetcher, HttpClient};
use artimirror_verify::{checksum_file, hex_eq};

use crate::checksums::{CHECKSUM_FILE, ChecksumLedger};
use crate::config::MismatchPolicy;
use crate::credential::ApiCredential;
use crate::descriptor::ArtifactDescriptor;
use crate::error::TransactionError;

/// Suffix of the staging file next to the target.
pub const PART_SUFFIX: &str = ".part";
/// Suffix of a quarantined download whose checksum did not match.
pub const MISMATCH_SUFFIX: &str = ".mismatch";

/// Result of one transaction. Never an error: every failure mode is a variant.
#[derive(Debug)]
pub enum DownloadOutcome {
    /// Verified and placed under its final name.
    Saved { checksum: String },
    /// The target already existed; nothing was requested.
    Skipped,
    /// The downloaded bytes do not hash to the advertised checksum.
    ChecksumMismatch { expected: String, actual: String },
    /// Network or local IO failure. Retrying on a later run may succeed.
    TransientFailure(TransactionError),
}

impl DownloadOutcome {
    pub fn is_saved(&self) -> bool { matches!(self, Self::Saved { .. }) }
}

pub struct DownloadTransaction<'a, C: HttpClient> {
    fetcher:     &'a Fetcher<C>,
    ledger:      &'a ChecksumLedger,
    options:     FetchOptions,
    on_mismatch: MismatchPolicy,
}

impl<'a, C: HttpClient> DownloadTransaction<'a, C> {
    pub fn new(
        fetcher: &'a Fetcher<C>,
        ledger: &'a ChecksumLedger,
        credential: &ApiCredential,
        on_mismatch: MismatchPolicy,
    ) -> Self {
        Self {
            fetcher,
            ledger,
            options: FetchOptions::default().headers(credential.download_headers()),
            on_mismatch,
        }
    }

    /// Mirror `descriptor` below `local_root`.
    ///
    /// Nothing ever appears under the final name unless its content was verified; the
    /// staging file is `{target}.part` and promotion is a single rename.
    pub async fn download(&self, descriptor: &ArtifactDescriptor, local_root: &Path) -> DownloadOutcome {
        if descriptor.name == CHECKSUM_FILE {
            tracing::warn!(artifact = %descriptor.remote_path(), "name collides with the checksum record, not mirrored");
            return DownloadOutcome::Skipped;
        }

        let target = descriptor.target_path(local_root);
        if matches!(tokio::fs::try_exists(&target).await, Ok(true)) {
            tracing::debug!(path = %target.display(), "already present");
            return DownloadOutcome::Skipped;
        }

        match self.transfer(descriptor, &target).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(artifact = %descriptor.remote_path(), error = %err, "download failed");
                DownloadOutcome::TransientFailure(err)
            }
        }
    }

    async fn transfer(
        &self,
        descriptor: &ArtifactDescriptor,
        target: &Path,
    ) -> Result<DownloadOutcome, TransactionError> {
        let dir = target.parent().ok_or_else(|| artimirror_fs::Error::NoParent(target.to_path_buf()))?;
        tokio::fs::create_dir_all(dir).await.map_err(|source| artimirror_fs::Error::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;

        let part = sibling(target, PART_SUFFIX);
        tracing::info!(artifact = %descriptor.remote_path(), "downloading");
        let bytes = self.fetcher.fetch_to(&descriptor.download_url, &part, &self.options).await?;

        let actual = match hash_part(&part).await {
            Ok(actual) => actual,
            Err(err) => {
                discard(&part);
                return Err(err);
            }
        };

        if let Some(expected) = descriptor.checksum.as_deref().filter(|c| !c.is_empty()) {
            if !hex_eq(expected, &actual) {
                self.reject(descriptor, &part, target, expected, &actual);
                return Ok(DownloadOutcome::ChecksumMismatch {
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        if let Err(err) = artimirror_fs::promote(&part, target) {
            discard(&part);
            return Err(err.into());
        }
        tracing::info!(path = %target.display(), bytes, sha256 = %actual, "saved");

        if let Err(err) = self
            .ledger
            .record(dir.to_path_buf(), descriptor.name.clone(), actual.clone())
            .await
        {
            tracing::warn!(dir = %dir.display(), error = %err, "could not update checksum record");
        }

        Ok(DownloadOutcome::Saved { checksum: actual })
    }

    fn reject(&self, descriptor: &ArtifactDescriptor, part: &Path, target: &Path, expected: &str, actual: &str) {
        tracing::error!(
            artifact = %descriptor.remote_path(),
            expected,
            actual,
            "checksum mismatch, artifact not saved"
        );

        match self.on_mismatch {
            MismatchPolicy::Discard => discard(part),
            MismatchPolicy::Quarantine => {
                let quarantine = sibling(target, MISMATCH_SUFFIX);
                if let Err(err) = artimirror_fs::promote(part, &quarantine) {
                    tracing::warn!(error = %err, "could not quarantine mismatched download");
                    discard(part);
                } else {
                    tracing::warn!(path = %quarantine.display(), "mismatched download kept for inspection");
                }
            }
        }
    }
}

async fn hash_part(part: &Path) -> Result<String, TransactionError> {
    let part = part.to_path_buf();
    Ok(tokio::task::spawn_blocking(move || checksum_file(part)).await??)
}

fn discard(part: &Path) {
    if let Err(err) = artimirror_fs::remove_file_if_exists(part) {
        tracing::warn!(error = %err, "could not remove staging file");
    }
}

fn sibling(target: &Path, suffix: &str) -> PathBuf {
    let mut name = target.file_name().unwrap_or_default().to_os_string();
    name.push(suffix);
    target.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksums::ChecksumRecord;
    use crate::test_support::{MockClient, descriptor, sha256_hex};
    use tempfile::tempdir;

    fn run<'a>(
        fetcher: &'a Fetcher<MockClient>,
        ledger: &'a ChecksumLedger,
        policy: MismatchPolicy,
    ) -> DownloadTransaction<'a, MockClient> {
        DownloadTransaction::new(fetcher, ledger, &ApiCredential::new("key"), policy)
    }

    #[tokio::test]
    async fn test_saved_places_file_and_records_checksum() {
        let root = tempdir().unwrap();
        let artifact = descriptor("product/1.0", "app.zip", Some(sha256_hex(b"payload").as_str()));
        let fetcher = Fetcher::new(MockClient::new().with_file(&artifact.download_url, b"payload"));
        let ledger = ChecksumLedger::new();

        let outcome = run(&fetcher, &ledger, MismatchPolicy::Discard).download(&artifact, root.path()).await;

        assert!(matches!(outcome, DownloadOutcome::Saved { ref checksum } if *checksum == sha256_hex(b"payload")));
        let target = artifact.target_path(root.path());
        assert_eq!(std::fs::read(&target).unwrap(), b"payload");
        assert!(!sibling(&target, PART_SUFFIX).exists());
        let record = ChecksumRecord::load(target.parent().unwrap());
        assert_eq!(record.get("app.zip"), Some(sha256_hex(b"payload").as_str()));

        let gets = fetcher.client().gets();
        assert_eq!(gets.len(), 1);
        assert!(gets[0].1.contains(&("X-JFrog-Art-Api".to_string(), "key".to_string())));
    }

    #[tokio::test]
    async fn test_upper_case_expected_checksum_matches() {
        let root = tempdir().unwrap();
        let expected = sha256_hex(b"payload").to_ascii_uppercase();
        let artifact = descriptor("", "app.zip", Some(expected.as_str()));
        let fetcher = Fetcher::new(MockClient::new().with_file(&artifact.download_url, b"payload"));
        let ledger = ChecksumLedger::new();

        let outcome = run(&fetcher, &ledger, MismatchPolicy::Discard).download(&artifact, root.path()).await;

        assert!(outcome.is_saved());
    }

    #[tokio::test]
    async fn test_existing_target_is_skipped_without_request() {
        let root = tempdir().unwrap();
        let artifact = descriptor("product/1.0", "app.zip", None);
        let target = artifact.target_path(root.path());
        std::fs::create_dir_all(target.parent().unwrap()).unwrap();
        std::fs::write(&target, b"old").unwrap();
        let fetcher = Fetcher::new(MockClient::new().with_file(&artifact.download_url, b"new"));
        let ledger = ChecksumLedger::new();

        let outcome = run(&fetcher, &ledger, MismatchPolicy::Discard).download(&artifact, root.path()).await;

        assert!(matches!(outcome, DownloadOutcome::Skipped));
        assert!(fetcher.client().gets().is_empty());
        assert_eq!(std::fs::read(&target).unwrap(), b"old");
    }

    #[tokio::test]
    async fn test_checksum_record_name_is_never_fetched() {
        let root = tempdir().unwrap();
        let artifact = descriptor("product/1.0", CHECKSUM_FILE, None);
        let dir = artifact.target_path(root.path()).parent().unwrap().to_path_buf();
        std::fs::create_dir_all(&dir).unwrap();
        let mut record = ChecksumRecord::default();
        record.insert("app.zip", "abc");
        record.save(&dir).unwrap();
        let before = std::fs::read(dir.join(CHECKSUM_FILE)).unwrap();
        let fetcher = Fetcher::new(MockClient::new().with_file(&artifact.download_url, b"{}"));
        let ledger = ChecksumLedger::new();

        let outcome = run(&fetcher, &ledger, MismatchPolicy::Discard).download(&artifact, root.path()).await;

        assert!(matches!(outcome, DownloadOutcome::Skipped));
        assert!(fetcher.client().gets().is_empty());
        assert_eq!(std::fs::read(dir.join(CHECKSUM_FILE)).unwrap(), before);
    }

    #[tokio::test]
    async fn test_mismatch_never_creates_target() {
        let root = tempdir().unwrap();
        let artifact = descriptor("product/1.0", "app.zip", Some(sha256_hex(b"expected").as_str()));
        let fetcher = Fetcher::new(MockClient::new().with_file(&artifact.download_url, b"tampered"));
        let ledger = ChecksumLedger::new();

        let outcome = run(&fetcher, &ledger, MismatchPolicy::Discard).download(&artifact, root.path()).await;

        match outcome {
            DownloadOutcome::ChecksumMismatch { expected, actual } => {
                assert_eq!(expected, sha256_hex(b"expected"));
                assert_eq!(actual, sha256_hex(b"tampered"));
            }
            other => panic!("expected mismatch, got {other:?}"),
        }
        let target = artifact.target_path(root.path());
        assert!(!target.exists());
        assert!(!sibling(&target, PART_SUFFIX).exists());
        assert!(!sibling(&target, MISMATCH_SUFFIX).exists());
        assert!(!target.parent().unwrap().join("checksums.json").exists());
    }

    #[tokio::test]
    async fn test_quarantine_keeps_mismatched_bytes() {
        let root = tempdir().unwrap();
        let artifact = descriptor("product/1.0", "app.zip", Some(sha256_hex(b"expected").as_str()));
        let fetcher = Fetcher::new(MockClient::new().with_file(&artifact.download_url, b"tampered"));
        let ledger = ChecksumLedger::new();

        let outcome = run(&fetcher, &ledger, MismatchPolicy::Quarantine).download(&artifact, root.path()).await;

        assert!(matches!(outcome, DownloadOutcome::ChecksumMismatch { .. }));
        let target = artifact.target_path(root.path());
        assert!(!target.exists());
        assert_eq!(std::fs::read(sibling(&target, MISMATCH_SUFFIX)).unwrap(), b"tampered");
    }

    #[tokio::test]
    async fn test_broken_transfer_is_transient_and_leaves_nothing() {
        let root = tempdir().unwrap();
        let artifact = descriptor("product/1.0", "app.zip", None);
        let fetcher = Fetcher::new(MockClient::new().with_broken(&artifact.download_url, b"partial"));
        let ledger = ChecksumLedger::new();

        let outcome = run(&fetcher, &ledger, MismatchPolicy::Discard).download(&artifact, root.path()).await;

        assert!(matches!(outcome, DownloadOutcome::TransientFailure(TransactionError::Fetch(_))));
        let target = artifact.target_path(root.path());
        assert!(!target.exists());
        assert!(!sibling(&target, PART_SUFFIX).exists());
    }

    #[tokio::test]
    async fn test_missing_remote_file_is_transient() {
        let root = tempdir().unwrap();
        let artifact = descriptor("product/1.0", "gone.zip", None);
        let fetcher = Fetcher::new(MockClient::new());
        let ledger = ChecksumLedger::new();

        let outcome = run(&fetcher, &ledger, MismatchPolicy::Discard).download(&artifact, root.path()).await;

        assert!(matches!(outcome, DownloadOutcome::TransientFailure(_)));
    }

    #[tokio::test]
    async fn test_absent_checksum_saves_computed_digest() {
        let root = tempdir().unwrap();
        let artifact = descriptor("product/1.0", "app.zip", None);
        let fetcher = Fetcher::new(MockClient::new().with_file(&artifact.download_url, b"payload"));
        let ledger = ChecksumLedger::new();

        run(&fetcher, &ledger, MismatchPolicy::Discard).download(&artifact, root.path()).await;

        let dir = artifact.local_dir(root.path());
        assert_eq!(ChecksumRecord::load(&dir).get("app.zip"), Some(sha256_hex(b"payload").as_str()));
    }

    #[test]
    fn test_sibling_names() {
        let target = Path::new("/m/builds/app.zip");
        assert_eq!(sibling(target, PART_SUFFIX), PathBuf::from("/m/builds/app.zip.part"));
    }
}
