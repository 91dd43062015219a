//! Records exchanged with the REST API and cached locally.
//!
//! Field names follow the API's camelCase JSON. Flags that are derived on the
//! client (`is_owner`, `is_mine`) are never read from the server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::ANONYMOUS_NAME;
use crate::types::{ClientId, QuestionId, SessionMode, SessionSlug};

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A shareable Q&A room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub slug: SessionSlug,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub mode: SessionMode,
    /// Whether this client created the session. Comes from local storage,
    /// not from the server.
    #[serde(skip)]
    pub is_owner: bool,
}

impl Session {
    pub fn display_title(&self) -> &str {
        match self.title.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => "Live Questions",
        }
    }
}

// ---------------------------------------------------------------------------
// Question
// ---------------------------------------------------------------------------

/// A single question in a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    pub content: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default, alias = "is_anonymous")]
    pub is_anonymous: bool,
    #[serde(default)]
    pub upvote_count: u32,
    #[serde(default)]
    pub is_answered: bool,
    /// `None` when the server omitted the flag (older backends).
    #[serde(default)]
    pub is_spotlighted: Option<bool>,
    /// Submitting client. Only reliable for questions this client created.
    #[serde(default, alias = "client_id")]
    pub client_id: Option<ClientId>,
    #[serde(default, skip_deserializing)]
    pub is_mine: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Question {
    /// Name shown next to the question.
    pub fn display_name(&self) -> &str {
        if self.is_anonymous {
            return ANONYMOUS_NAME;
        }
        match self.nickname.as_deref().map(str::trim) {
            Some(n) if !n.is_empty() => n,
            _ => ANONYMOUS_NAME,
        }
    }

    pub fn spotlighted(&self) -> bool {
        self.is_spotlighted.unwrap_or(false)
    }

    pub fn is_owned_by(&self, client: &ClientId) -> bool {
        self.client_id.as_ref() == Some(client)
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Aggregate counters shown on the landing page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    #[serde(default)]
    pub total_sessions: u64,
    #[serde(default)]
    pub total_participants: u64,
    #[serde(default = "Utc::now")]
    pub last_updated: DateTime<Utc>,
}

impl Stats {
    /// Placeholder shown when the stats endpoint is unreachable.
    pub fn empty() -> Self {
        Self {
            total_sessions: 0,
            total_participants: 0,
            last_updated: Utc::now(),
        }
    }
}
