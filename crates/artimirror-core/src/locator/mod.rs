//! Artifact discovery.
//!
//! Sends one search query built from the configured filters and turns the response into
//! [`ArtifactDescriptor`]s. The result order is whatever the server returned.

mod filter;
mod query;

pub use filter::{CandidateFilter, RawArtifact, SearchResults};
pub use query::{CREATED_FORMAT, INCLUDED_FIELDS};

use artimirror_fetch::HttpClient;
use chrono::{DateTime, Utc};
use url::Url;

use crate::config::{QueryAuth, SyncConfig};
use crate::credential::ApiCredential;
use crate::descriptor::ArtifactDescriptor;
use crate::error::{ConfigError, QueryError};

/// Longest response excerpt carried in a [`QueryError::Status`].
const ERROR_BODY_LIMIT: usize = 512;

pub struct Locator {
    base_url:  Url,
    query_url: Url,
    filter:    CandidateFilter,
    auth:      QueryAuth,
    username:  String,
}

impl Locator {
    pub fn new(config: &SyncConfig) -> Result<Self, ConfigError> {
        let base_url = config.base_url()?;
        let mut query_url = base_url.clone();
        query_url
            .path_segments_mut()
            .map_err(|_| ConfigError::Invalid {
                field:  "artifactory_url",
                reason: "cannot carry a path".into(),
            })?
            .pop_if_empty()
            .extend(["artifactory", "api", "search", "aql"]);

        Ok(Self {
            base_url,
            query_url,
            filter: CandidateFilter::from_config(config)?,
            auth: config.query_auth,
            username: config.username.clone(),
        })
    }

    pub fn query_url(&self) -> &Url { &self.query_url }

    pub fn filter(&self) -> &CandidateFilter { &self.filter }

    /// The search expression that [`Locator::locate_at`] would send at `now`.
    pub fn query_text(&self, now: DateTime<Utc>) -> String {
        query::build(&self.filter, self.filter.created_threshold(now))
    }

    pub async fn locate<C: HttpClient>(
        &self,
        client: &C,
        credential: &ApiCredential,
    ) -> Result<Vec<ArtifactDescriptor>, QueryError> {
        self.locate_at(client, credential, Utc::now()).await
    }

    /// Run the search with an explicit clock.
    pub async fn locate_at<C: HttpClient>(
        &self,
        client: &C,
        credential: &ApiCredential,
        now: DateTime<Utc>,
    ) -> Result<Vec<ArtifactDescriptor>, QueryError> {
        let threshold = self.filter.created_threshold(now);
        let body = query::build(&self.filter, threshold);
        let headers = credential.query_headers(self.auth, &self.username);
        tracing::debug!(url = %self.query_url, query = %body, "searching for artifacts");

        let response = client
            .post_text(self.query_url.as_str(), body, &headers)
            .await
            .map_err(|e| QueryError::Transport(e.into()))?;

        if !response.is_success() {
            return Err(QueryError::Status {
                status: response.status,
                body:   excerpt(&response.body),
            });
        }

        let results: SearchResults = serde_json::from_str(&response.body).map_err(QueryError::Parse)?;
        let received = results.results.len();
        let selected = filter::select(results.results, &self.filter, threshold, &self.base_url);
        tracing::debug!(received, selected = selected.len(), "search results filtered");

        Ok(selected)
    }
}

/// Convenience wrapper: build a [`Locator`] for `config` and run one search.
pub async fn locate<C: HttpClient>(
    client: &C,
    config: &SyncConfig,
    credential: &ApiCredential,
) -> Result<Vec<ArtifactDescriptor>, QueryError> {
    let locator = Locator::new(config).map_err(|e| QueryError::Url(e.to_string()))?;
    locator.locate(client, credential).await
}

fn excerpt(body: &str) -> String {
    match body.char_indices().nth(ERROR_BODY_LIMIT) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
