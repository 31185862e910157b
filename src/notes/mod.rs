//! Best-effort logging of answered queries to a Notion database.
//!
//! [`Recorder::record`] never fails: a missing client, a missing database id,
//! or an error from the service all come back as `false`, with a warning in
//! the log. No retries.

pub mod notion;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::backend::BackendError;
use crate::router::Classification;

/// Maximum characters stored in the title property.
pub const TITLE_MAX_CHARS: usize = 100;
/// Maximum characters stored in the response property.
pub const RESPONSE_MAX_CHARS: usize = 2000;

/// A row as written to the notes database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotionRecord {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: Classification,
    pub response: String,
}

impl NotionRecord {
    /// Build a record, truncating title and response to their limits.
    pub fn new(query: &str, response: &str, kind: Classification) -> Self {
        Self {
            title: truncate_chars(query, TITLE_MAX_CHARS),
            kind,
            response: truncate_chars(response, RESPONSE_MAX_CHARS),
        }
    }
}

/// First `max` characters of `s` (Unicode scalar values, not bytes).
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Create-only access to a notes database.
#[async_trait]
pub trait NotesStore: Send + Sync {
    async fn create_page(&self, database_id: &str, record: &NotionRecord)
        -> Result<(), BackendError>;
}

#[derive(Clone, Default)]
pub struct Recorder {
    store: Option<Arc<dyn NotesStore>>,
    database_id: Option<String>,
}

impl Recorder {
    pub fn new(store: Option<Arc<dyn NotesStore>>, database_id: Option<String>) -> Self {
        Self { store, database_id }
    }

    /// A recorder that never writes.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_configured(&self) -> bool {
        self.store.is_some() && self.database_id.is_some()
    }

    /// Write one interaction. Returns whether the service acknowledged it.
    pub async fn record(&self, query: &str, response: &str, kind: Classification) -> bool {
        let (Some(store), Some(database_id)) = (&self.store, &self.database_id) else {
            tracing::warn!("notes database not configured, interaction not saved");
            return false;
        };

        let record = NotionRecord::new(query, response, kind);
        match store.create_page(database_id, &record).await {
            Ok(()) => {
                tracing::info!(kind = %kind, "interaction saved to notes database");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to save interaction to notes database");
                false
            }
        }
    }
}

impl std::fmt::Debug for Recorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recorder")
            .field("configured", &self.is_configured())
            .finish()
    }
}
