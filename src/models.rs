use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A normalized catalog record. `id` is the stable remote identifier and is
/// used as the primary key everywhere, including the favorites table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub poster_url: Option<String>,
}

/// A catalog item after poster enrichment. `poster` stays `None` both when no
/// poster URL exists and when the download failed; `enrichment_failed`
/// distinguishes the two.
#[derive(Debug, Clone)]
pub struct EnrichedItem {
    pub item: CatalogItem,
    pub poster: Option<Vec<u8>>,
    pub enrichment_failed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct FavoriteRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub poster_url: Option<String>,
    pub user_note: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SessionStatus {
    Pending,
    Running,
    Completed,
    Cancelled,
    Failed,
}

/// Point-in-time view of one page-load session. Only terminal snapshots
/// (`Completed` or `Failed`) carry items; running sessions expose progress
/// events alone.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub id: u64,
    pub page: u32,
    pub status: SessionStatus,
    pub progress_percent: u8,
    pub items: Vec<EnrichedItem>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Events a session pushes to subscribers. Recency filtering happens before
/// delivery, so subscribers only ever see events from the current session.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Progress {
        id: u64,
        page: u32,
        percent: u8,
    },
    Completed(SessionSnapshot),
    Failed {
        snapshot: SessionSnapshot,
        error: String,
    },
}

impl SessionEvent {
    pub fn session_id(&self) -> u64 {
        match self {
            SessionEvent::Progress { id, .. } => *id,
            SessionEvent::Completed(snapshot) => snapshot.id,
            SessionEvent::Failed { snapshot, .. } => snapshot.id,
        }
    }
}

impl EnrichedItem {
    /// An item that needed no download: either no poster URL exists or the
    /// poster arrived intact.
    pub fn ready(item: CatalogItem, poster: Option<Vec<u8>>) -> Self {
        Self {
            item,
            poster,
            enrichment_failed: false,
        }
    }

    /// An item whose poster download soft-failed; the page still renders it
    /// with a placeholder.
    pub fn degraded(item: CatalogItem) -> Self {
        Self {
            item,
            poster: None,
            enrichment_failed: true,
        }
    }
}

impl FavoriteRecord {
    pub fn from_item(item: &CatalogItem, user_note: impl Into<String>) -> Self {
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            description: item.description.clone(),
            poster_url: item.poster_url.clone(),
            user_note: user_note.into(),
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Pending => write!(f, "Pending"),
            SessionStatus::Running => write!(f, "Running"),
            SessionStatus::Completed => write!(f, "Completed"),
            SessionStatus::Cancelled => write!(f, "Cancelled"),
            SessionStatus::Failed => write!(f, "Failed"),
        }
    }
}
