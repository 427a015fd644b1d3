use crate::database::FavoritesStore;
use crate::error::Result;
use crate::manager::SessionManager;
use crate::models::{EnrichedItem, FavoriteRecord, SessionSnapshot, SessionStatus};
use std::sync::Arc;
use tracing::debug;

/// The two mutually exclusive display modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Browsing(u32),
    Favorites,
}

/// One renderable row, regardless of mode.
#[derive(Debug, Clone)]
pub enum DisplayRecord {
    Catalog(EnrichedItem),
    Favorite(FavoriteRecord),
}

/// The currently displayed list. Browsing mode is sourced from the latest
/// completed session for the current page; favorites mode from a
/// point-in-time store read taken when the mode is entered. Switching modes
/// discards the inactive mode's display data but cancels nothing.
pub struct ViewState {
    manager: Arc<SessionManager>,
    store: Arc<FavoritesStore>,
    mode: ViewMode,
    browsing: Option<SessionSnapshot>,
    favorites: Vec<FavoriteRecord>,
    last_adopted_id: u64,
}

impl ViewState {
    pub fn new(manager: Arc<SessionManager>, store: Arc<FavoritesStore>) -> Self {
        Self {
            manager,
            store,
            mode: ViewMode::Browsing(1),
            browsing: None,
            favorites: Vec::new(),
            last_adopted_id: 0,
        }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Switch modes. Entering browsing reuses the manager's last completed
    /// session for that page instead of re-fetching; a reload is always an
    /// explicit `start_session` by the caller.
    pub async fn set_mode(&mut self, mode: ViewMode) -> Result<()> {
        match mode {
            ViewMode::Favorites => {
                self.favorites = self.store.list().await?;
                self.browsing = None;
                self.mode = mode;
            }
            ViewMode::Browsing(_) => {
                self.favorites.clear();
                self.browsing = None;
                self.mode = mode;
                if let Some(snapshot) = self.manager.current_result() {
                    self.restore(snapshot);
                }
            }
        }
        Ok(())
    }

    /// Reinstall the latest completed session on mode re-entry. Unlike
    /// `adopt`, an already-adopted session id is acceptable here.
    fn restore(&mut self, snapshot: SessionSnapshot) {
        if snapshot.status != SessionStatus::Completed {
            return;
        }
        let ViewMode::Browsing(page) = self.mode else {
            return;
        };
        if snapshot.page != page || snapshot.id < self.last_adopted_id {
            return;
        }
        self.last_adopted_id = snapshot.id;
        self.browsing = Some(snapshot);
    }

    /// Apply a completed session to the browsing display. Rejected unless the
    /// view is browsing that page and the session id is strictly newer than
    /// the last one adopted.
    pub fn adopt(&mut self, snapshot: SessionSnapshot) -> bool {
        if snapshot.status != SessionStatus::Completed {
            return false;
        }
        let ViewMode::Browsing(page) = self.mode else {
            return false;
        };
        if snapshot.page != page {
            return false;
        }
        if snapshot.id <= self.last_adopted_id {
            debug!(
                "Refusing to adopt session {} (last adopted {})",
                snapshot.id, self.last_adopted_id
            );
            return false;
        }

        self.last_adopted_id = snapshot.id;
        self.browsing = Some(snapshot);
        true
    }

    /// Upsert a favorite; in favorites mode the visible set is re-read so it
    /// stays consistent with the store.
    pub async fn add_favorite(&mut self, record: &FavoriteRecord) -> Result<()> {
        self.store.upsert(record).await?;
        if self.mode == ViewMode::Favorites {
            self.favorites = self.store.list().await?;
        }
        Ok(())
    }

    pub async fn remove_favorite(&mut self, id: &str) -> Result<()> {
        self.store.remove(id).await?;
        if self.mode == ViewMode::Favorites {
            self.favorites = self.store.list().await?;
        }
        Ok(())
    }

    pub fn current(&self) -> Vec<DisplayRecord> {
        match self.mode {
            ViewMode::Favorites => self
                .favorites
                .iter()
                .cloned()
                .map(DisplayRecord::Favorite)
                .collect(),
            ViewMode::Browsing(_) => self
                .browsing
                .as_ref()
                .map(|snapshot| {
                    snapshot
                        .items
                        .iter()
                        .cloned()
                        .map(DisplayRecord::Catalog)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}
