use thiserror::Error;

use askany_shared::{QuestionId, SessionSlug};
use askany_store::StoreError;

use crate::commands::questions::QuestionDraft;
use crate::events::{Notice, NoticeLevel};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Session not found: {0}")]
    SessionNotFound(SessionSlug),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Already upvoted question {0}")]
    DuplicateVote(QuestionId),

    #[error("Only the session owner can do that")]
    NotOwner,

    #[error("Server responded {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Local storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A question submission failed; the draft is handed back for resubmit.
    #[error("Question was not submitted: {source}")]
    SubmitFailed {
        draft: QuestionDraft,
        #[source]
        source: Box<ClientError>,
    },
}

impl ClientError {
    /// Errors after which the session view cannot continue.
    pub fn is_terminal(&self) -> bool {
        match self {
            Self::SessionNotFound(_) => true,
            Self::SubmitFailed { source, .. } => source.is_terminal(),
            _ => false,
        }
    }

    /// The message shown to the user for this error.
    pub fn notice(&self) -> Notice {
        let message = match self {
            Self::Transport(_) => "Could not reach the server. Retrying shortly.".to_string(),
            Self::SessionNotFound(_) => "Session not found".to_string(),
            Self::NotFound(what) => format!("{what} no longer exists"),
            Self::Validation(msg) => msg.clone(),
            Self::DuplicateVote(_) => "You have already upvoted this question".to_string(),
            Self::NotOwner => "Only the session owner can do that".to_string(),
            Self::Server { .. } | Self::Decode(_) => {
                "Something went wrong. Please try again.".to_string()
            }
            Self::Store(_) => "Could not save local data".to_string(),
            Self::Config(msg) => msg.clone(),
            Self::SubmitFailed { source, .. } => match source.as_ref() {
                Self::Validation(msg) => msg.clone(),
                _ => "Failed to submit question. Please try again.".to_string(),
            },
        };

        Notice {
            level: NoticeLevel::Error,
            message,
        }
    }

    /// Recover the draft from a failed submission.
    pub fn into_draft(self) -> Option<QuestionDraft> {
        match self {
            Self::SubmitFailed { draft, .. } => Some(draft),
            _ => None,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_missing_session_is_terminal() {
        assert!(ClientError::SessionNotFound(SessionSlug("s".into())).is_terminal());
        assert!(!ClientError::NotFound("question 1".into()).is_terminal());
        assert!(!ClientError::Decode("bad".into()).is_terminal());
    }

    #[test]
    fn duplicate_vote_has_its_own_message() {
        let dup = ClientError::DuplicateVote(QuestionId::from(1)).notice();
        let other = ClientError::Server {
            status: 500,
            message: "boom".into(),
        }
        .notice();
        assert_eq!(dup.level, NoticeLevel::Error);
        assert_ne!(dup.message, other.message);
    }

    #[test]
    fn failed_submit_returns_draft() {
        let draft = QuestionDraft::new("How?");
        let err = ClientError::SubmitFailed {
            draft: draft.clone(),
            source: Box::new(ClientError::Validation("Question is too long".into())),
        };
        assert_eq!(err.notice().message, "Question is too long");
        assert_eq!(err.into_draft(), Some(draft));
    }
}
