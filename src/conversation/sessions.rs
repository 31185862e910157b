//! Session registry for the HTTP surface.
//!
//! Each session id maps to its own [`ConversationMemory`]. The memory is
//! behind its own lock, held for the whole of a request, so queries within a
//! session run one at a time while separate sessions proceed independently.
//!
//! The registry is bounded: sessions idle longer than
//! [`SessionLimits::idle_ttl`] are dropped on the next `open`, and when
//! [`SessionLimits::max_sessions`] is reached the least recently used
//! session is evicted to make room.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use uuid::Uuid;

use super::ConversationMemory;
use crate::config::ServerConfig;

pub type SharedMemory = Arc<Mutex<ConversationMemory>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    pub idle_ttl: Duration,
    pub max_sessions: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            idle_ttl: Duration::from_secs(3600),
            max_sessions: 1000,
        }
    }
}

impl From<&ServerConfig> for SessionLimits {
    fn from(config: &ServerConfig) -> Self {
        Self {
            idle_ttl: Duration::from_secs(config.session_idle_secs),
            max_sessions: config.max_sessions.max(1),
        }
    }
}

#[derive(Debug)]
struct Session {
    memory: SharedMemory,
    last_used: Instant,
}

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, Session>>,
    limits: SessionLimits,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: SessionLimits) -> Self {
        Self {
            sessions: Mutex::default(),
            limits,
        }
    }

    /// Return the session for `id`, or start a new one under a fresh id when
    /// `id` is absent, unknown, or expired.
    pub async fn open(&self, id: Option<Uuid>) -> (Uuid, SharedMemory) {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        self.evict_idle(&mut sessions, now);

        if let Some(id) = id {
            if let Some(session) = sessions.get_mut(&id) {
                session.last_used = now;
                return (id, Arc::clone(&session.memory));
            }
        }

        while sessions.len() >= self.limits.max_sessions {
            let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, s)| s.last_used)
                .map(|(id, _)| *id)
            else {
                break;
            };
            sessions.remove(&oldest);
            tracing::info!(session = %oldest, "session evicted, store at capacity");
        }

        let id = Uuid::now_v7();
        let memory = SharedMemory::default();
        sessions.insert(
            id,
            Session {
                memory: Arc::clone(&memory),
                last_used: now,
            },
        );
        tracing::info!(session = %id, "session started");
        (id, memory)
    }

    /// Look up a live session without starting one.
    pub async fn get(&self, id: &Uuid) -> Option<SharedMemory> {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        self.evict_idle(&mut sessions, now);
        sessions.get_mut(id).map(|session| {
            session.last_used = now;
            Arc::clone(&session.memory)
        })
    }

    /// End a session, discarding its memory. Returns whether it existed.
    pub async fn close(&self, id: &Uuid) -> bool {
        let removed = self.sessions.lock().await.remove(id).is_some();
        if removed {
            tracing::info!(session = %id, "session ended");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn evict_idle(&self, sessions: &mut HashMap<Uuid, Session>, now: Instant) {
        let before = sessions.len();
        sessions.retain(|_, s| now.duration_since(s.last_used) < self.limits.idle_ttl);
        let expired = before - sessions.len();
        if expired > 0 {
            tracing::info!(expired, "idle sessions expired");
        }
    }
}
