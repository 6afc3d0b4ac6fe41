use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;

use crate::error::FetchError;

/// A boxed stream type for HTTP response bodies.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// A fully buffered text response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextResponse {
    pub status: u16,
    pub body:   String,
}

impl TextResponse {
    pub fn is_success(&self) -> bool { (200..300).contains(&self.status) }
}

/// Asynchronous HTTP client abstraction.
///
/// The minimal surface the mirror needs: a streamed GET for artifact bodies and a
/// buffered POST for search queries. Implementations own redirect handling, timeout
/// configuration and error mapping.
///
/// # Implementations
///
/// - [`ReqwestClient`]: Production implementation using `reqwest`
/// - In-memory doubles in tests
pub trait HttpClient: Send + Sync {
    /// Error type for HTTP operations.
    type Error: std::error::Error + Into<FetchError> + Send + 'static;

    /// Open a streaming GET and return the response body.
    ///
    /// # Errors
    ///
    /// Fails on transport errors and on non-success status codes; a returned stream
    /// always belongs to a successful response.
    fn stream(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> impl Future<
        Output = std::result::Result<
            BoxStream<'static, std::result::Result<Bytes, Self::Error>>,
            Self::Error,
        >,
    > + Send;

    /// POST a plain-text body and buffer the response.
    ///
    /// Non-success statuses are returned as values so callers can report the body.
    fn post_text(
        &self,
        url: &str,
        body: String,
        headers: &[(String, String)],
    ) -> impl Future<Output = std::result::Result<TextResponse, Self::Error>> + Send;
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use super::*;
    use crate::data::Timeouts;
    use futures_util::StreamExt;

    /// Production HTTP client implementation using reqwest.
    #[derive(Clone)]
    pub struct ReqwestClient {
        client:        reqwest::Client,
        query_timeout: std::time::Duration,
    }

    impl ReqwestClient {
        pub fn new(timeouts: Timeouts) -> crate::error::Result<Self> {
            let client = reqwest::Client::builder()
                .connect_timeout(timeouts.connect)
                .read_timeout(timeouts.read)
                .user_agent(concat!("artimirror/", env!("CARGO_PKG_VERSION")))
                .build()
                .map_err(|e| FetchError::Client(e.to_string()))?;
            Ok(Self {
                client,
                query_timeout: timeouts.query,
            })
        }
    }

    impl HttpClient for ReqwestClient {
        type Error = FetchError;

        async fn stream(
            &self,
            url: &str,
            headers: &[(String, String)],
        ) -> std::result::Result<BoxStream<'static, std::result::Result<Bytes, Self::Error>>, Self::Error>
        {
            let mut request = self.client.get(url);
            for (key, value) in headers {
                request = request.header(key, value);
            }

            let response = request.send().await?.error_for_status()?;
            let stream = response.bytes_stream().map(|chunk| chunk.map_err(FetchError::from));
            Ok(Box::pin(stream))
        }

        async fn post_text(
            &self,
            url: &str,
            body: String,
            headers: &[(String, String)],
        ) -> std::result::Result<TextResponse, Self::Error> {
            let mut request = self.client.post(url).timeout(self.query_timeout).body(body);
            for (key, value) in headers {
                request = request.header(key, value);
            }

            let response = request.send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(TextResponse { status, body })
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestClient;
