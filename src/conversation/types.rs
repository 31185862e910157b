//! Conversation record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::router::Classification;

/// One answered query and its reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    /// The user's text as submitted.
    pub user: String,
    /// The reply returned to the user.
    pub assistant: String,
    /// Which backend produced the reply.
    #[serde(rename = "type")]
    pub classification: Classification,
    /// When the exchange was recorded.
    pub at: DateTime<Utc>,
}

impl Exchange {
    pub fn new(
        user: impl Into<String>,
        assistant: impl Into<String>,
        classification: Classification,
    ) -> Self {
        Self {
            user: user.into(),
            assistant: assistant.into(),
            classification,
            at: Utc::now(),
        }
    }
}
