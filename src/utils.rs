use crate::config::HttpConfig;
use crate::error::{CineFetchError, Result};
use reqwest::{Client, Response};
use std::time::Duration;

const DEFAULT_USER_AGENT: &str = "CineFetch/0.1 (Movie Catalog Browser)";

#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(config: &HttpConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(
                config
                    .user_agent
                    .clone()
                    .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            )
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    /// GET with query parameters, failing on any non-2xx status.
    pub async fn get_with_query(&self, url: &str, query: &[(&str, &str)]) -> Result<Response> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| CineFetchError::remote_unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CineFetchError::remote_unavailable(format!(
                "{} returned HTTP {}",
                url,
                response.status()
            )));
        }

        Ok(response)
    }

    /// Plain GET for raw byte payloads (posters). Errors here are the
    /// caller's to classify.
    pub async fn get_raw(&self, url: &str) -> Result<Response> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CineFetchError::fetch_failed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CineFetchError::fetch_failed(format!(
                "{} returned HTTP {}",
                url,
                response.status()
            )));
        }

        Ok(response)
    }
}
