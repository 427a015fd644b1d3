use crate::error::{CineFetchError, Result};
use crate::manager::BusMessage;
use crate::models::{EnrichedItem, SessionEvent, SessionSnapshot, SessionStatus};
use crate::traits::{CatalogClient, ImageFetcher};
use chrono::{DateTime, Utc};
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info, warn};

/// One page-load-and-enrich unit of work. The page fetch is all-or-nothing;
/// poster enrichment fans out concurrently and soft-fails per item.
///
/// Cancellation is cooperative: once the shared flag flips, the next emission
/// attempt returns `StaleSession` and the run loop unwinds without sending
/// anything further. In-flight poster downloads are allowed to finish and be
/// discarded.
pub struct LoadSession {
    id: u64,
    page: u32,
    catalog: Arc<dyn CatalogClient>,
    images: Arc<dyn ImageFetcher>,
    cancel: Arc<AtomicBool>,
    bus: UnboundedSender<BusMessage>,
    started_at: DateTime<Utc>,
}

impl LoadSession {
    pub(crate) fn new(
        id: u64,
        page: u32,
        catalog: Arc<dyn CatalogClient>,
        images: Arc<dyn ImageFetcher>,
        cancel: Arc<AtomicBool>,
        bus: UnboundedSender<BusMessage>,
    ) -> Self {
        Self {
            id,
            page,
            catalog,
            images,
            cancel,
            bus,
            started_at: Utc::now(),
        }
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// Push an event onto the manager's bus, unless this session has been
    /// superseded. The bus applies its own recency filter on top, so a lost
    /// race here is still harmless.
    fn emit(&self, event: SessionEvent) -> Result<()> {
        if self.cancelled() {
            return Err(CineFetchError::StaleSession(self.id));
        }
        // A closed bus means the manager is gone; nothing left to notify.
        let _ = self.bus.send(BusMessage::Event(event));
        Ok(())
    }

    fn snapshot(
        &self,
        status: SessionStatus,
        progress_percent: u8,
        items: Vec<EnrichedItem>,
    ) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            page: self.page,
            status,
            progress_percent,
            items,
            started_at: self.started_at,
            finished_at: Some(Utc::now()),
        }
    }

    pub async fn run(self) -> Result<()> {
        info!("Session {} loading catalog page {}", self.id, self.page);

        let items = match self.catalog.fetch_page(self.page).await {
            Ok(items) => items,
            Err(e) => {
                error!("Session {} page {} fetch failed: {}", self.id, self.page, e);
                let snapshot = self.snapshot(SessionStatus::Failed, 0, Vec::new());
                self.emit(SessionEvent::Failed {
                    snapshot,
                    error: e.to_string(),
                })?;
                return Ok(());
            }
        };

        let total = items.len();

        // An empty page is a valid, immediately-complete session.
        if total == 0 {
            info!("Session {} page {} is empty", self.id, self.page);
            self.emit(SessionEvent::Completed(self.snapshot(
                SessionStatus::Completed,
                100,
                Vec::new(),
            )))?;
            return Ok(());
        }

        // Metadata arrival is the progress baseline.
        self.emit(SessionEvent::Progress {
            id: self.id,
            page: self.page,
            percent: 0,
        })?;

        let mut tasks = FuturesUnordered::new();
        for (index, item) in items.into_iter().enumerate() {
            let images = Arc::clone(&self.images);
            tasks.push(async move {
                match item.poster_url.clone() {
                    Some(url) => match images.fetch_bytes(&url).await {
                        Ok(bytes) => (index, EnrichedItem::ready(item, Some(bytes))),
                        Err(e) => {
                            warn!("Poster fetch for item {} soft-failed: {}", item.id, e);
                            (index, EnrichedItem::degraded(item))
                        }
                    },
                    None => (index, EnrichedItem::ready(item, None)),
                }
            });
        }

        // Enrichment completes in network order; slots reconcile results back
        // to source catalog order before delivery.
        let mut slots: Vec<Option<EnrichedItem>> = (0..total).map(|_| None).collect();
        let mut completed = 0usize;

        while let Some((index, enriched)) = tasks.next().await {
            completed += 1;
            slots[index] = Some(enriched);

            let percent = if completed == total {
                100
            } else {
                ((completed * 100) as f64 / total as f64).round() as u8
            };
            self.emit(SessionEvent::Progress {
                id: self.id,
                page: self.page,
                percent,
            })?;
        }

        let ordered: Vec<EnrichedItem> = slots.into_iter().flatten().collect();
        debug_assert_eq!(ordered.len(), total);

        info!(
            "Session {} completed page {} with {} items",
            self.id, self.page, total
        );
        self.emit(SessionEvent::Completed(self.snapshot(
            SessionStatus::Completed,
            100,
            ordered,
        )))?;

        Ok(())
    }
}
