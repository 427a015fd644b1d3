use crate::config::ApiConfig;
use crate::error::{CineFetchError, Result};
use crate::models::CatalogItem;
use crate::traits::CatalogClient;
use crate::utils::HttpClient;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

/// Production catalog collaborator against the TMDB "now playing" listing.
/// Raw records are normalized here; nothing downstream sees TMDB field names.
pub struct TmdbCatalogClient {
    http_client: HttpClient,
    base_url: Url,
    api_key: String,
    language: String,
    image_base_url: String,
}

#[derive(Debug, Deserialize)]
struct RawPage {
    results: Vec<RawMovie>,
}

#[derive(Debug, Deserialize)]
struct RawMovie {
    id: i64,
    title: String,
    #[serde(default)]
    overview: String,
    poster_path: Option<String>,
}

impl TmdbCatalogClient {
    pub fn new(http_client: HttpClient, config: &ApiConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)?;
        let api_key = config.api_key.clone().unwrap_or_default();

        Ok(Self {
            http_client,
            base_url,
            api_key,
            language: config.language.clone(),
            image_base_url: config.image_base_url.clone(),
        })
    }

    fn normalize(&self, raw: RawMovie) -> CatalogItem {
        // TMDB poster paths are root-relative fragments like "/abc.jpg";
        // the size-specific image base is prepended verbatim.
        let poster_url = raw
            .poster_path
            .filter(|p| !p.is_empty())
            .map(|p| format!("{}{}", self.image_base_url, p));

        CatalogItem {
            id: raw.id.to_string(),
            title: raw.title,
            description: raw.overview,
            poster_url,
        }
    }
}

#[async_trait::async_trait]
impl CatalogClient for TmdbCatalogClient {
    async fn fetch_page(&self, page: u32) -> Result<Vec<CatalogItem>> {
        let url = format!("{}/movie/now_playing", self.base_url.as_str().trim_end_matches('/'));
        let page_param = page.to_string();
        let query = [
            ("api_key", self.api_key.as_str()),
            ("language", self.language.as_str()),
            ("page", page_param.as_str()),
        ];

        info!("Fetching catalog page {}", page);
        let response = self.http_client.get_with_query(&url, &query).await?;

        let body = response
            .text()
            .await
            .map_err(|e| CineFetchError::remote_unavailable(e.to_string()))?;

        let raw_page: RawPage = serde_json::from_str(&body)
            .map_err(|e| CineFetchError::malformed_response(e.to_string()))?;

        let items: Vec<CatalogItem> = raw_page
            .results
            .into_iter()
            .map(|raw| self.normalize(raw))
            .collect();

        debug!("Catalog page {} yielded {} items", page, items.len());
        Ok(items)
    }
}
