use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::config::QueryAuth;

/// Header carrying the API key on artifact downloads.
pub const API_KEY_HEADER: &str = "X-JFrog-Art-Api";

/// Opaque API key supplied by the caller.
///
/// The value never appears in `Debug` output or log events.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiCredential(String);

impl ApiCredential {
    pub fn new(key: impl Into<String>) -> Self { Self(key.into()) }

    /// Headers for an artifact GET.
    pub fn download_headers(&self) -> Vec<(String, String)> {
        vec![(API_KEY_HEADER.to_string(), self.0.clone())]
    }

    /// Headers for the plain-text search POST.
    pub fn query_headers(&self, auth: QueryAuth, username: &str) -> Vec<(String, String)> {
        let authorization = match auth {
            QueryAuth::Basic => format!("Basic {}", STANDARD.encode(format!("{username}:{}", self.0))),
            QueryAuth::Bearer => format!("Bearer {}", self.0),
        };
        vec![
            ("Content-Type".to_string(), "text/plain".to_string()),
            ("Authorization".to_string(), authorization),
        ]
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("ApiCredential(***)") }
}
