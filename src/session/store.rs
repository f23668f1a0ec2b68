use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::Mutex;

use crate::{session::SessionState, utils};

/// Sessions untouched for this long are dropped when a new one is created.
pub const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Handle to one session, cloned into every request that carries its cookie.
///
/// The state mutex is held for the whole of an operation, which serializes
/// mutations coming from concurrent requests of the same browser.
#[derive(Clone)]
pub struct Session {
    pub id: String,
    pub state: Arc<Mutex<SessionState>>,
}

struct Entry {
    state: Arc<Mutex<SessionState>>,
    last_seen: Instant,
}

pub struct SessionStore {
    sessions: Mutex<HashMap<String, Entry>>,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_idle_timeout(SESSION_IDLE_TIMEOUT)
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_timeout,
        }
    }

    /// Looks up the session for `id`, creating a fresh one when the id is
    /// missing or unknown. The flag is `true` for a new session.
    pub async fn resolve(&self, id: Option<&str>) -> (Session, bool) {
        let mut sessions = self.sessions.lock().await;
        let now = Instant::now();

        if let Some(id) = id {
            if let Some(entry) = sessions.get_mut(id) {
                entry.last_seen = now;
                return (
                    Session {
                        id: id.to_string(),
                        state: Arc::clone(&entry.state),
                    },
                    false,
                );
            }
        }

        let timeout = self.idle_timeout;
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) < timeout);

        let id = utils::generate_session_id();
        let state = Arc::new(Mutex::new(SessionState::new()));
        sessions.insert(
            id.clone(),
            Entry {
                state: Arc::clone(&state),
                last_seen: now,
            },
        );
        (Session { id, state }, true)
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
