use std::sync::Arc;
use std::time::Duration;

/// Per-request network timeouts.
///
/// `read` bounds the wait for each chunk rather than the whole body, so large
/// artifacts are not cut off while data keeps flowing. `query` caps the whole
/// exchange of a buffered POST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub connect: Duration,
    pub read:    Duration,
    pub query:   Duration,
}

impl Default for Timeouts {
    fn default() -> Self { Self::uniform(Duration::from_secs(60)) }
}

impl Timeouts {
    pub fn uniform(timeout: Duration) -> Self {
        Self {
            connect: timeout,
            read:    timeout,
            query:   timeout,
        }
    }
}

/// Options for a single fetch.
///
/// # Examples
///
/// ```
/// use artimirror_fetch::FetchOptions;
///
/// let options = FetchOptions::default().headers(vec![
///     ("X-JFrog-Art-Api".to_string(), "secret".to_string()),
///     ("Accept".to_string(), "*/*".to_string()),
/// ]);
/// assert_eq!(options.headers.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Headers sent with the request.
    pub headers: Arc<[(String, String)]>,
}

impl FetchOptions {
    /// Replace all custom headers.
    #[must_use]
    pub fn headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = Arc::from(headers);
        self
    }
}
