//! I/O operations: the HTTP client seam and the streaming fetcher.

mod fetcher;
mod http;

pub use fetcher::Fetcher;
pub use http::{BoxStream, HttpClient, TextResponse};
#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
