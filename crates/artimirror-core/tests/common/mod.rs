use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use artimirror_core::{HttpClient, SyncConfig};
use artimirror_fetch::{BoxStream, FetchError, TextResponse};
use bytes::Bytes;
use chrono::{TimeDelta, Utc};
use serde_json::json;
use sha2::{Digest, Sha256};

pub const BASE: &str = "http://repo.test";

#[derive(Default)]
struct Server {
    files:   HashMap<String, Vec<u8>>,
    results: Vec<serde_json::Value>,
    gets:    Vec<String>,
}

/// A repository holding a fixed set of artifacts, answering searches with all of them.
#[derive(Clone, Default)]
pub struct FakeRepository {
    server: Arc<Mutex<Server>>,
}

impl FakeRepository {
    /// Publish `body` as `builds/{path}/{name}`, created `hours_old` hours ago. The
    /// advertised checksum is `advertised` or else the true digest of `body`.
    pub fn publish(&self, path: &str, name: &str, hours_old: i64, body: &[u8], advertised: Option<&str>) {
        let mut server = self.server.lock().unwrap();
        server
            .files
            .insert(format!("{BASE}/artifactory/builds/{path}/{name}"), body.to_vec());
        server.results.push(json!({
            "repo": "builds",
            "path": path,
            "name": name,
            "created": (Utc::now() - TimeDelta::hours(hours_old)).to_rfc3339(),
            "sha256": advertised.map_or_else(|| sha256_hex(body), str::to_string),
        }));
    }

    pub fn get_count(&self) -> usize { self.server.lock().unwrap().gets.len() }

    pub fn gets(&self) -> Vec<String> { self.server.lock().unwrap().gets.clone() }
}

impl HttpClient for FakeRepository {
    type Error = FetchError;

    async fn stream(
        &self,
        url: &str,
        _headers: &[(String, String)],
    ) -> Result<BoxStream<'static, Result<Bytes, FetchError>>, FetchError> {
        let body = {
            let mut server = self.server.lock().unwrap();
            server.gets.push(url.to_string());
            server.files.get(url).cloned()
        };
        // Give concurrent transactions a chance to interleave.
        tokio::task::yield_now().await;

        match body {
            Some(body) => {
                let chunks: Vec<Result<Bytes, FetchError>> =
                    body.chunks(4).map(|c| Ok(Bytes::copy_from_slice(c))).collect();
                Ok(Box::pin(futures_util::stream::iter(chunks)))
            }
            None => Err(FetchError::Status {
                status: 404,
                url:    url.to_string(),
            }),
        }
    }

    async fn post_text(
        &self,
        _url: &str,
        _body: String,
        _headers: &[(String, String)],
    ) -> Result<TextResponse, FetchError> {
        let results = self.server.lock().unwrap().results.clone();
        Ok(TextResponse {
            status: 200,
            body:   json!({ "results": results }).to_string(),
        })
    }
}

pub fn sha256_hex(data: &[u8]) -> String { hex::encode(Sha256::digest(data)) }

pub fn config(root: &Path, concurrency: usize) -> SyncConfig {
    let text = json!({
        "artifactory_url": BASE,
        "repo": "builds",
        "path": "product",
        "file_masks": ["*.zip"],
        "max_artifact_age_days": 7,
        "download_dir": root,
        "keep_files_days": 30,
        "max_concurrent_downloads": concurrency,
    })
    .to_string();
    SyncConfig::from_json(&text).unwrap()
}

/// Every file below `root` with its content, keyed by relative path.
pub fn snapshot(root: &Path) -> Vec<(String, Vec<u8>)> {
    let mut files: Vec<_> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let relative = e.path().strip_prefix(root).unwrap().to_string_lossy().into_owned();
            (relative, std::fs::read(e.path()).unwrap())
        })
        .collect();
    files.sort();
    files
}
