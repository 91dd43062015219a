use serde::{Deserialize, Serialize};

use crate::models::{Question, Session};
use crate::types::{ClientId, SessionMode, SessionSlug};

/// Response to `POST /api/sessions`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub slug: SessionSlug,
}

/// Response to `GET /api/sessions/{slug}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session: Session,
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// Body of `POST /api/questions`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewQuestion {
    #[serde(rename = "sessionSlug")]
    pub session_slug: SessionSlug,
    pub content: String,
    pub nickname: Option<String>,
    pub is_anonymous: bool,
    #[serde(rename = "clientId")]
    pub client_id: ClientId,
}

/// Body of `POST /api/questions/{id}/upvote`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpvoteRequest {
    pub client_id: ClientId,
}

/// Body of `PATCH /api/questions/{id}/answer`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest {
    pub is_answered: bool,
}

/// Body of `PATCH /api/questions/{id}/spotlight`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotlightRequest {
    pub is_spotlighted: bool,
}

/// Body of `PATCH /api/sessions/{slug}/mode`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetModeRequest {
    pub mode: SessionMode,
}

/// Error payload returned by the API on non-2xx responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.error
            .or(self.message)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
    }
}
