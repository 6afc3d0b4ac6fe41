use std::collections::HashSet;

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use glob::Pattern;
use serde::Deserialize;
use url::Url;

use crate::checksums::CHECKSUM_FILE;
use crate::config::SyncConfig;
use crate::descriptor::{self, ArtifactDescriptor};
use crate::error::ConfigError;
use crate::wildcard;

/// One item of the search response. Fields the engine does not use are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RawArtifact {
    pub repo:    String,
    pub path:    String,
    pub name:    String,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub sha256:  Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub results: Vec<RawArtifact>,
}

/// Compiled selection predicates shared by the server query and the local re-check.
#[derive(Debug, Clone)]
pub struct CandidateFilter {
    repo:         String,
    prefix_glob:  String,
    prefix:       Pattern,
    masks:        Vec<(String, Pattern)>,
    excludes:     Vec<(String, Pattern)>,
    max_age_days: u32,
}

impl CandidateFilter {
    pub fn from_config(config: &SyncConfig) -> Result<Self, ConfigError> {
        let compile = |field: &'static str, raw: &str| {
            wildcard::compile(raw)
                .map(|pattern| (raw.to_string(), pattern))
                .map_err(|e| ConfigError::Invalid {
                    field,
                    reason: format!("{raw:?}: {e}"),
                })
        };

        let prefix_glob = format!("{}*", config.path_prefix);
        let (_, prefix) = compile("path", &prefix_glob)?;

        Ok(Self {
            repo: config.repo.clone(),
            prefix,
            prefix_glob,
            masks: config
                .name_masks
                .iter()
                .map(|m| compile("file_masks", m))
                .collect::<Result<_, _>>()?,
            excludes: config
                .exclude_path_patterns
                .iter()
                .map(|p| compile("exclude_paths", p))
                .collect::<Result<_, _>>()?,
            max_age_days: config.max_age_days,
        })
    }

    pub fn repo(&self) -> &str { &self.repo }

    pub fn prefix_glob(&self) -> &str { &self.prefix_glob }

    pub fn name_masks(&self) -> impl Iterator<Item = &str> { self.masks.iter().map(|(raw, _)| raw.as_str()) }

    pub fn exclude_patterns(&self) -> impl Iterator<Item = &str> {
        self.excludes.iter().map(|(raw, _)| raw.as_str())
    }

    /// Oldest creation time (exclusive) a candidate may have at `now`, truncated to whole
    /// seconds like the timestamp sent to the server.
    pub fn created_threshold(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(TimeDelta::days(i64::from(self.max_age_days)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
            .trunc_subsecs(0)
    }

    /// Same predicates as the server-side query, evaluated locally.
    pub fn accepts(&self, item: &RawArtifact, threshold: DateTime<Utc>) -> bool {
        item.repo == self.repo
            && self.prefix.matches(&item.path)
            && item.created > threshold
            && !self.excludes.iter().any(|(_, p)| p.matches(&item.path))
            && self.masks.iter().any(|(_, p)| p.matches(&item.name))
    }
}

/// Turn raw search results into descriptors.
///
/// Items failing the local predicates, carrying path segments that would escape the
/// mirror root, named like the per-directory checksum record, or repeating an earlier
/// `(repo, path, name)` are dropped.
pub fn select(
    items: Vec<RawArtifact>,
    filter: &CandidateFilter,
    threshold: DateTime<Utc>,
    base_url: &Url,
) -> Vec<ArtifactDescriptor> {
    let mut seen = HashSet::new();
    let mut selected = Vec::with_capacity(items.len());

    for item in items {
        if !filter.accepts(&item, threshold) {
            tracing::debug!(repo = %item.repo, path = %item.path, file = %item.name, "dropping result outside filter");
            continue;
        }

        let path = descriptor::normalize_path(&item.path);
        let safe = descriptor::is_plain_segment(&item.name)
            && (path.is_empty() || path.split('/').all(descriptor::is_plain_segment));
        if !safe {
            tracing::warn!(path = %item.path, file = %item.name, "ignoring result with unsafe path");
            continue;
        }

        if item.name == CHECKSUM_FILE {
            tracing::warn!(path = %item.path, file = %item.name, "ignoring result named like the checksum record");
            continue;
        }

        if !seen.insert((item.repo.clone(), path.clone(), item.name.clone())) {
            continue;
        }

        let Some(url) = descriptor::download_url(base_url, &item.repo, &path, &item.name) else {
            tracing::warn!(base = %base_url, "base URL cannot carry a path");
            continue;
        };

        selected.push(ArtifactDescriptor {
            download_url: url.to_string(),
            checksum: item
                .sha256
                .map(|s| s.trim().to_ascii_lowercase())
                .filter(|s| !s.is_empty()),
            created_at: item.created,
            repo: item.repo,
            path,
            name: item.name,
        });
    }

    selected
}
