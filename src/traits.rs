use crate::error::Result;
use crate::models::CatalogItem;

/// Trait for the remote catalog collaborator that serves paginated items
#[async_trait::async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetch one page of normalized catalog items; the sequence may be empty
    async fn fetch_page(&self, page: u32) -> Result<Vec<CatalogItem>>;
}

/// Trait for the byte-transport collaborator that downloads poster images
#[async_trait::async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Download raw image bytes for a poster URL
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>>;
}
