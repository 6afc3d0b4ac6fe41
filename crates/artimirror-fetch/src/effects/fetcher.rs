use std::path::Path;

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;

use crate::data::FetchOptions;
use crate::effects::http::HttpClient;
use crate::error::{FetchError, Result};

/// Streams response bodies into staging files.
///
/// The fetcher never places anything under a final name: it writes the body verbatim
/// to the staging path it is given and removes that file again if the transfer fails.
/// Verification and promotion belong to the caller.
pub struct Fetcher<C: HttpClient> {
    client: C,
}

impl<C: HttpClient> Fetcher<C> {
    pub fn new(client: C) -> Self { Self { client } }

    pub fn client(&self) -> &C { &self.client }

    /// Download `url` into `staging`, returning the number of bytes written.
    ///
    /// On any error the partially written staging file is deleted before returning.
    pub async fn fetch_to(&self, url: &str, staging: &Path, options: &FetchOptions) -> Result<u64> {
        match self.stream_to_staging(url, staging, options).await {
            Ok(bytes) => Ok(bytes),
            Err(err) => {
                if let Err(cleanup) = artimirror_fs::remove_file_if_exists(staging) {
                    tracing::warn!(path = %staging.display(), %cleanup, "could not remove partial download");
                }
                Err(err)
            }
        }
    }

    async fn stream_to_staging(
        &self,
        url: &str,
        staging: &Path,
        options: &FetchOptions,
    ) -> Result<u64> {
        let write_err = |source| FetchError::Write {
            path: staging.to_path_buf(),
            source,
        };

        let mut stream = self.client.stream(url, &options.headers).await.map_err(Into::<FetchError>::into)?;
        let mut file = tokio::fs::File::create(staging).await.map_err(write_err)?;

        let mut bytes_downloaded = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(Into::<FetchError>::into)?;
            file.write_all(&chunk).await.map_err(write_err)?;
            bytes_downloaded += chunk.len() as u64;
        }

        file.flush().await.map_err(write_err)?;
        file.sync_all().await.map_err(write_err)?;

        tracing::debug!(url, bytes = bytes_downloaded, "download complete");
        Ok(bytes_downloaded)
    }
}
