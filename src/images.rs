use crate::error::{CineFetchError, Result};
use crate::traits::ImageFetcher;
use crate::utils::HttpClient;
use tracing::debug;

/// Production poster fetcher. Any network, HTTP, or decode problem collapses
/// into `FetchFailed`; the session treats all of them as a per-item soft
/// failure.
pub struct HttpImageFetcher {
    http_client: HttpClient,
}

impl HttpImageFetcher {
    pub fn new(http_client: HttpClient) -> Self {
        Self { http_client }
    }
}

#[async_trait::async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.http_client.get_raw(url).await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| CineFetchError::fetch_failed(e.to_string()))?;

        // Reject payloads that are not decodable images; a broken poster is
        // no better than a missing one.
        image::load_from_memory(&bytes)
            .map_err(|e| CineFetchError::fetch_failed(format!("{}: {}", url, e)))?;

        debug!("Fetched poster {} ({} bytes)", url, bytes.len());
        Ok(bytes.to_vec())
    }
}
