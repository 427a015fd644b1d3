use crate::models::{SessionEvent, SessionSnapshot};
use crate::session::LoadSession;
use crate::traits::{CatalogClient, ImageFetcher};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info};

/// Internal bus traffic. `Opened` is enqueued by `start_session` before the
/// new session can emit anything, so on the FIFO bus the dispatcher always
/// learns about a newer session ahead of that session's first event. Recency
/// filtering is therefore an id comparison, never a timing accident.
pub(crate) enum BusMessage {
    Opened(u64),
    Event(SessionEvent),
}

struct ActiveSession {
    id: u64,
    cancel: Arc<AtomicBool>,
}

/// Single source of truth for which load session is current. At most one
/// session runs at a time; starting a new one marks the previous session
/// cancelled fire-and-forget and its eventual output is discarded.
pub struct SessionManager {
    catalog: Arc<dyn CatalogClient>,
    images: Arc<dyn ImageFetcher>,
    next_id: AtomicU64,
    active: Mutex<Option<ActiveSession>>,
    latest: Arc<Mutex<Option<SessionSnapshot>>>,
    subscribers: Arc<Mutex<Vec<UnboundedSender<SessionEvent>>>>,
    bus_tx: UnboundedSender<BusMessage>,
}

impl SessionManager {
    pub fn new(catalog: Arc<dyn CatalogClient>, images: Arc<dyn ImageFetcher>) -> Arc<Self> {
        let (bus_tx, bus_rx) = mpsc::unbounded_channel();
        let latest = Arc::new(Mutex::new(None));
        let subscribers: Arc<Mutex<Vec<UnboundedSender<SessionEvent>>>> =
            Arc::new(Mutex::new(Vec::new()));

        tokio::spawn(dispatch(bus_rx, Arc::clone(&latest), Arc::clone(&subscribers)));

        Arc::new(Self {
            catalog,
            images,
            next_id: AtomicU64::new(0),
            active: Mutex::new(None),
            latest,
            subscribers,
            bus_tx,
        })
    }

    /// Register an observer for progress, completion, and failure events of
    /// whatever session is current at delivery time.
    pub fn subscribe(&self) -> UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .expect("subscriber registry poisoned")
            .push(tx);
        rx
    }

    /// Start loading `page`, superseding any running session. Returns the new
    /// session id; ids increase monotonically and define recency.
    pub fn start_session(&self, page: u32) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let cancel = Arc::new(AtomicBool::new(false));

        {
            let mut active = self.active.lock().expect("active session lock poisoned");
            if let Some(previous) = active.take() {
                previous.cancel.store(true, Ordering::SeqCst);
                debug!("Session {} superseded by session {}", previous.id, id);
            }
            *active = Some(ActiveSession {
                id,
                cancel: Arc::clone(&cancel),
            });
        }

        // Must land on the bus before any event from the new session.
        let _ = self.bus_tx.send(BusMessage::Opened(id));

        info!("Starting session {} for page {}", id, page);
        let session = LoadSession::new(
            id,
            page,
            Arc::clone(&self.catalog),
            Arc::clone(&self.images),
            cancel,
            self.bus_tx.clone(),
        );
        tokio::spawn(async move {
            if let Err(e) = session.run().await {
                if e.is_stale() {
                    debug!("Session {} stopped after supersession", id);
                } else {
                    error!("Session {} aborted: {}", id, e);
                }
            }
        });

        id
    }

    /// Latest terminal (completed or failed) snapshot, if any. Running
    /// sessions are visible only through subscribed progress events.
    pub fn current_result(&self) -> Option<SessionSnapshot> {
        self.latest
            .lock()
            .expect("latest snapshot lock poisoned")
            .clone()
    }
}

/// The single coordination task. It owns the current-session watermark and is
/// the only writer of the latest terminal snapshot; because all traffic
/// funnels through one FIFO channel, an event from a superseded session can
/// never be delivered after its successor was opened.
async fn dispatch(
    mut bus_rx: UnboundedReceiver<BusMessage>,
    latest: Arc<Mutex<Option<SessionSnapshot>>>,
    subscribers: Arc<Mutex<Vec<UnboundedSender<SessionEvent>>>>,
) {
    let mut current_id = 0u64;

    while let Some(message) = bus_rx.recv().await {
        match message {
            BusMessage::Opened(id) => {
                current_id = current_id.max(id);
            }
            BusMessage::Event(event) => {
                let id = event.session_id();
                if id != current_id {
                    debug!("Dropping stale event from session {}", id);
                    continue;
                }

                match &event {
                    SessionEvent::Completed(snapshot) => {
                        *latest.lock().expect("latest snapshot lock poisoned") =
                            Some(snapshot.clone());
                    }
                    SessionEvent::Failed { snapshot, .. } => {
                        *latest.lock().expect("latest snapshot lock poisoned") =
                            Some(snapshot.clone());
                    }
                    SessionEvent::Progress { .. } => {}
                }

                subscribers
                    .lock()
                    .expect("subscriber registry poisoned")
                    .retain(|tx| tx.send(event.clone()).is_ok());
            }
        }
    }
}
