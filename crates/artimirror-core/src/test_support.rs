//! In-memory server double shared by the unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use artimirror_fetch::{BoxStream, FetchError, HttpClient, TextResponse};
use artimirror_verify::Sha256Hasher;
use bytes::Bytes;
use chrono::Utc;

use crate::config::SyncConfig;
use crate::descriptor::{self, ArtifactDescriptor};

pub const BASE: &str = "http://mock";

#[derive(Debug, Clone)]
pub struct RecordedPost {
    pub url:     String,
    pub body:    String,
    pub headers: Vec<(String, String)>,
}

#[derive(Default)]
struct State {
    files:  HashMap<String, Vec<u8>>,
    broken: HashMap<String, Vec<u8>>,
    search: Option<(u16, String)>,
    gets:   Vec<(String, Vec<(String, String)>)>,
    posts:  Vec<RecordedPost>,
}

/// Serves registered files on GET and a canned search response on POST.
#[derive(Clone, Default)]
pub struct MockClient {
    state: Arc<Mutex<State>>,
}

impl MockClient {
    pub fn new() -> Self { Self::default() }

    pub fn with_file(self, url: &str, body: &[u8]) -> Self {
        self.state.lock().unwrap().files.insert(url.to_string(), body.to_vec());
        self
    }

    /// The body of `url` breaks off after `head`.
    pub fn with_broken(self, url: &str, head: &[u8]) -> Self {
        self.state.lock().unwrap().broken.insert(url.to_string(), head.to_vec());
        self
    }

    pub fn with_search(self, status: u16, body: impl Into<String>) -> Self {
        self.state.lock().unwrap().search = Some((status, body.into()));
        self
    }

    pub fn gets(&self) -> Vec<(String, Vec<(String, String)>)> { self.state.lock().unwrap().gets.clone() }

    pub fn get_urls(&self) -> Vec<String> { self.gets().into_iter().map(|(url, _)| url).collect() }

    pub fn posts(&self) -> Vec<RecordedPost> { self.state.lock().unwrap().posts.clone() }
}

impl HttpClient for MockClient {
    type Error = FetchError;

    async fn stream(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<BoxStream<'static, Result<Bytes, FetchError>>, FetchError> {
        let mut state = self.state.lock().unwrap();
        state.gets.push((url.to_string(), headers.to_vec()));

        let items: Vec<Result<Bytes, FetchError>> = if let Some(body) = state.files.get(url) {
            body.chunks(3).map(|c| Ok(Bytes::copy_from_slice(c))).collect()
        } else if let Some(head) = state.broken.get(url) {
            vec![
                Ok(Bytes::copy_from_slice(head)),
                Err(FetchError::Network("connection reset by peer".into())),
            ]
        } else {
            return Err(FetchError::Status {
                status: 404,
                url:    url.to_string(),
            });
        };
        Ok(Box::pin(futures_util::stream::iter(items)))
    }

    async fn post_text(
        &self,
        url: &str,
        body: String,
        headers: &[(String, String)],
    ) -> Result<TextResponse, FetchError> {
        let mut state = self.state.lock().unwrap();
        state.posts.push(RecordedPost {
            url: url.to_string(),
            body,
            headers: headers.to_vec(),
        });

        let (status, body) = state
            .search
            .clone()
            .unwrap_or_else(|| (200, r#"{"results": []}"#.to_string()));
        Ok(TextResponse { status, body })
    }
}

pub fn sha256_hex(data: &[u8]) -> String { hex::encode(Sha256Hasher::digest(data)) }

pub fn descriptor(path: &str, name: &str, checksum: Option<&str>) -> ArtifactDescriptor {
    let base = url::Url::parse(BASE).unwrap();
    ArtifactDescriptor {
        repo:         "builds".into(),
        path:         path.into(),
        name:         name.into(),
        created_at:   Utc::now(),
        checksum:     checksum.map(str::to_string),
        download_url: descriptor::download_url(&base, "builds", path, name).unwrap().to_string(),
    }
}

/// A valid configuration pointing at [`BASE`]: repo `builds`, prefix `product/`, masks
/// `*.zip` and `*.msi`, 7 day window, 5 day retention.
pub fn config(root: impl Into<std::path::PathBuf>) -> SyncConfig {
    SyncConfig {
        base_url:                 BASE.into(),
        repo:                     "builds".into(),
        path_prefix:              "product/".into(),
        name_masks:               vec!["*.zip".into(), "*.msi".into()],
        max_age_days:             7,
        download_root:            root.into(),
        global_keep_days:         5,
        exclude_path_patterns:    Vec::new(),
        folder_retention:         Vec::new(),
        username:                 "ci".into(),
        query_auth:               Default::default(),
        max_concurrent_downloads: 1,
        request_timeout_secs:     60,
        run_timeout_secs:         None,
        on_mismatch:              Default::default(),
    }
}
