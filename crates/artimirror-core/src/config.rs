//! Run configuration.
//!
//! The on-disk document is JSON using the historical key names (`artifactory_url`,
//! `file_masks`, `keep_files_days`, ...). Fields are renamed onto descriptive Rust names
//! here and never change after [`SyncConfig::validate`] succeeds.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;
use crate::wildcard;

const fn default_concurrency() -> usize { 1 }

const fn default_request_timeout() -> u64 { 60 }

/// How the search call presents the API key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryAuth {
    /// HTTP Basic with `username:key`.
    #[default]
    Basic,
    /// `Authorization: Bearer key`.
    Bearer,
}

/// What happens to a download whose checksum does not match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MismatchPolicy {
    /// Delete the staging file.
    #[default]
    Discard,
    /// Keep it as `{name}.mismatch` next to the target for inspection.
    Quarantine,
}

/// A subtree whose files are kept for a different number of days than the default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RetentionRule {
    /// Directory relative to `{download_dir}/{repo}`.
    #[serde(rename = "path")]
    pub relative_path: String,
    pub keep_days:     u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    #[serde(rename = "artifactory_url")]
    pub base_url: String,
    pub repo: String,
    #[serde(rename = "path")]
    pub path_prefix: String,
    #[serde(rename = "file_masks")]
    pub name_masks: Vec<String>,
    #[serde(rename = "max_artifact_age_days")]
    pub max_age_days: u32,
    #[serde(rename = "download_dir")]
    pub download_root: PathBuf,
    #[serde(rename = "keep_files_days")]
    pub global_keep_days: u32,
    #[serde(rename = "exclude_paths", default)]
    pub exclude_path_patterns: Vec<String>,
    #[serde(default)]
    pub folder_retention: Vec<RetentionRule>,

    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub query_auth: QueryAuth,
    #[serde(default = "default_concurrency")]
    pub max_concurrent_downloads: usize,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub run_timeout_secs: Option<u64>,
    #[serde(default)]
    pub on_mismatch: MismatchPolicy,
}

impl SyncConfig {
    /// Read, parse and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check everything the engine relies on before any network or disk activity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base_url()?;

        if self.repo.trim().is_empty() {
            return Err(invalid("repo", "must not be empty"));
        }
        if self.repo.contains('/') || self.repo == "." || self.repo == ".." {
            return Err(invalid("repo", "must be a single path segment"));
        }
        if self.name_masks.is_empty() {
            return Err(invalid("file_masks", "at least one mask is required"));
        }
        for mask in &self.name_masks {
            if mask.is_empty() {
                return Err(invalid("file_masks", "masks must not be empty"));
            }
            wildcard::compile(mask).map_err(|e| invalid("file_masks", format!("{mask:?}: {e}")))?;
        }
        for pattern in &self.exclude_path_patterns {
            wildcard::compile(pattern)
                .map_err(|e| invalid("exclude_paths", format!("{pattern:?}: {e}")))?;
        }
        wildcard::compile(&format!("{}*", self.path_prefix)).map_err(|e| invalid("path", e.to_string()))?;
        if self.max_concurrent_downloads == 0 {
            return Err(invalid("max_concurrent_downloads", "must be at least 1"));
        }
        if self.request_timeout_secs == 0 {
            return Err(invalid("request_timeout_secs", "must be at least 1"));
        }
        if self.download_root.as_os_str().is_empty() {
            return Err(invalid("download_dir", "must not be empty"));
        }

        Ok(())
    }

    /// The parsed server URL. Only `http` and `https` are accepted.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| invalid("artifactory_url", e.to_string()))?;
        if matches!(url.scheme(), "http" | "https") && !url.cannot_be_a_base() {
            Ok(url)
        } else {
            Err(invalid("artifactory_url", format!("unsupported scheme {:?}", url.scheme())))
        }
    }

    /// Root of the local mirror for the configured repository.
    pub fn repo_root(&self) -> PathBuf { self.download_root.join(&self.repo) }

    pub fn request_timeout(&self) -> Duration { Duration::from_secs(self.request_timeout_secs) }

    pub fn run_timeout(&self) -> Option<Duration> { self.run_timeout_secs.map(Duration::from_secs) }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}
