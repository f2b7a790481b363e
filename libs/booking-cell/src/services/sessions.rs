use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use shared_config::DEFAULT_SESSION_TTL_SECS;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::BookingError;
use crate::services::flow::BookingFlow;

pub type SharedFlow = Arc<Mutex<BookingFlow>>;

struct SessionEntry {
    flow: SharedFlow,
    touched: Instant,
}

impl SessionEntry {
    fn is_idle(&self, ttl: Duration) -> bool {
        self.touched.elapsed() > ttl
    }
}

/// In-memory booking sessions, one [`BookingFlow`] each. Nothing here
/// outlives the process.
///
/// A session untouched for longer than the idle TTL is dropped: lazily when
/// it is looked up, and in bulk whenever a new session is opened.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(Duration::from_secs(DEFAULT_SESSION_TTL_SECS))
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub async fn insert(&self, flow: BookingFlow) -> (Uuid, SharedFlow) {
        let id = Uuid::new_v4();
        let shared = Arc::new(Mutex::new(flow));

        let mut sessions = self.sessions.write().await;
        let purged = purge_idle(&mut sessions, self.ttl);
        if purged > 0 {
            info!("Dropped {} idle booking sessions", purged);
        }
        sessions.insert(
            id,
            SessionEntry {
                flow: Arc::clone(&shared),
                touched: Instant::now(),
            },
        );

        debug!("Opened booking session {}", id);
        (id, shared)
    }

    /// Looks up a session and marks it as used.
    pub async fn get(&self, id: Uuid) -> Result<SharedFlow, BookingError> {
        let mut sessions = self.sessions.write().await;

        let entry = sessions
            .get_mut(&id)
            .ok_or(BookingError::SessionNotFound(id))?;

        if entry.is_idle(self.ttl) {
            sessions.remove(&id);
            debug!("Booking session {} expired", id);
            return Err(BookingError::SessionNotFound(id));
        }

        entry.touched = Instant::now();
        Ok(Arc::clone(&entry.flow))
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), BookingError> {
        match self.sessions.write().await.remove(&id) {
            Some(_) => {
                debug!("Closed booking session {}", id);
                Ok(())
            }
            None => Err(BookingError::SessionNotFound(id)),
        }
    }

    /// Drops every idle session and returns how many went.
    pub async fn purge_expired(&self) -> usize {
        purge_idle(&mut *self.sessions.write().await, self.ttl)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn purge_idle(sessions: &mut HashMap<Uuid, SessionEntry>, ttl: Duration) -> usize {
    let before = sessions.len();
    sessions.retain(|_, entry| !entry.is_idle(ttl));
    before - sessions.len()
}
