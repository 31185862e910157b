//! Per-session conversation memory.
//!
//! A [`ConversationMemory`] is an append-only log of [`Exchange`]s. Entries
//! keep insertion order and are never modified once pushed. Each chat session
//! owns its own instance; nothing here is shared between sessions.

pub mod sessions;
pub mod types;

pub use sessions::{SessionLimits, SessionStore};
pub use types::Exchange;

/// Number of exchanges shown by history views.
pub const HISTORY_VIEW_LEN: usize = 10;

#[derive(Debug, Clone, Default)]
pub struct ConversationMemory {
    entries: Vec<Exchange>,
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, exchange: Exchange) {
        self.entries.push(exchange);
    }

    /// All exchanges, oldest first.
    pub fn entries(&self) -> &[Exchange] {
        &self.entries
    }

    /// The last `n` exchanges, oldest first.
    pub fn recent(&self, n: usize) -> &[Exchange] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
