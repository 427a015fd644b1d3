#![allow(dead_code)]

use async_trait::async_trait;
use cinefetch::error::{CineFetchError, Result};
use cinefetch::models::CatalogItem;
use cinefetch::traits::{CatalogClient, ImageFetcher};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub fn item(id: &str, title: &str, poster_url: Option<&str>) -> CatalogItem {
    CatalogItem {
        id: id.to_string(),
        title: title.to_string(),
        description: format!("{} description", title),
        poster_url: poster_url.map(|u| u.to_string()),
    }
}

/// Catalog fake with per-call delay, per-page outages, and a call counter.
pub struct FakeCatalog {
    pages: HashMap<u32, Vec<CatalogItem>>,
    delay: Duration,
    failing: HashSet<u32>,
    pub calls: AtomicUsize,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            delay: Duration::ZERO,
            failing: HashSet::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_page(mut self, page: u32, items: Vec<CatalogItem>) -> Self {
        self.pages.insert(page, items);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing_page(mut self, page: u32) -> Self {
        self.failing.insert(page);
        self
    }
}

#[async_trait]
impl CatalogClient for FakeCatalog {
    async fn fetch_page(&self, page: u32) -> Result<Vec<CatalogItem>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.failing.contains(&page) {
            return Err(CineFetchError::remote_unavailable("fake outage"));
        }
        Ok(self.pages.get(&page).cloned().unwrap_or_default())
    }
}

/// Image fake: each URL resolves to its own bytes after a configurable delay,
/// so completion order can be forced in tests.
pub struct FakeImages {
    delays: HashMap<String, Duration>,
    failing: HashSet<String>,
}

impl FakeImages {
    pub fn new() -> Self {
        Self {
            delays: HashMap::new(),
            failing: HashSet::new(),
        }
    }

    pub fn with_delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    pub fn failing_url(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }
}

#[async_trait]
impl ImageFetcher for FakeImages {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(url) {
            return Err(CineFetchError::fetch_failed("fake fetch failure"));
        }
        Ok(url.as_bytes().to_vec())
    }
}
