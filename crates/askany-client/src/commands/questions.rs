//! Question actions: submit, upvote, mark answered, toggle spotlight.
//!
//! Nothing is applied to the view before the server answers. On success the
//! returned record replaces its counterpart by id; on failure the user gets a
//! notice and the list is left as it was.

use std::sync::PoisonError;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use askany_shared::protocol::NewQuestion;
use askany_shared::{Question, QuestionId, SessionSlug};

use crate::error::{ClientError, Result};
use crate::events::Notice;
use crate::session::SessionClient;

/// What the question form holds. Returned intact when a submission fails so
/// the user can resubmit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub content: String,
    pub nickname: Option<String>,
    pub is_anonymous: bool,
}

impl QuestionDraft {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }

    pub fn anonymous(mut self) -> Self {
        self.is_anonymous = true;
        self
    }

    /// Trimmed content, or a validation error if there is none.
    fn validated_content(&self) -> Result<String> {
        let content = self.content.trim();
        if content.is_empty() {
            return Err(ClientError::Validation("Question cannot be empty".into()));
        }
        Ok(content.to_string())
    }

    /// Nickname as sent to the API: dropped when anonymous or blank.
    fn effective_nickname(&self) -> Option<String> {
        if self.is_anonymous {
            return None;
        }
        self.nickname
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
    }
}

/// Clears a pending-upvote marker when the request finishes, however it ends.
struct PendingUpvote<'a> {
    session: &'a SessionClient,
    id: QuestionId,
}

impl Drop for PendingUpvote<'_> {
    fn drop(&mut self) {
        self.session
            .pending_upvotes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

impl SessionClient {
    /// Submit a new question and show it at the top of the list.
    pub async fn submit_question(&self, draft: QuestionDraft) -> Result<Question> {
        match self.try_submit(&draft).await {
            Ok(question) => {
                self.events.notice(Notice::success("Question submitted"));
                Ok(question)
            }
            Err(source) => Err(self.report(
                "submit_question",
                ClientError::SubmitFailed {
                    draft,
                    source: Box::new(source),
                },
            )),
        }
    }

    async fn try_submit(&self, draft: &QuestionDraft) -> Result<Question> {
        let content = draft.validated_content()?;
        let (slug, client_id) = {
            let view = self.lock_view();
            (view.slug.clone(), view.context.client_id.clone())
        };

        let body = NewQuestion {
            session_slug: slug.clone(),
            content,
            nickname: draft.effective_nickname(),
            is_anonymous: draft.is_anonymous,
            client_id,
        };
        let created = self.api.submit_question(&body).await?;

        let (question, questions) = {
            let mut view = self.lock_view();
            view.add_own(created.clone());
            let question = view.find(&created.id).cloned().unwrap_or(created);
            (question, view.questions.clone())
        };

        // The cache is what keeps this question visible if the next poll
        // races ahead of the server. The server already has the question, so
        // a failed write is only logged.
        if let Err(e) = self.local.save_questions(&slug, &questions) {
            warn!(slug = %slug, error = %e, "failed to persist question cache");
        }

        info!(slug = %slug, question = %question.id, "question submitted");
        self.emit_synced();
        Ok(question)
    }

    /// Upvote a question once per client.
    pub async fn upvote(&self, id: &QuestionId) -> Result<Question> {
        self.try_upvote(id)
            .await
            .map_err(|err| self.report("upvote", err))
    }

    async fn try_upvote(&self, id: &QuestionId) -> Result<Question> {
        let (slug, client_id) = {
            let view = self.lock_view();
            (view.slug.clone(), view.context.client_id.clone())
        };

        if self.local.has_upvoted(&slug, id)? {
            return Err(ClientError::DuplicateVote(id.clone()));
        }

        let _pending = {
            let mut pending = self
                .pending_upvotes
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if !pending.insert(id.clone()) {
                return Err(ClientError::DuplicateVote(id.clone()));
            }
            PendingUpvote {
                session: self,
                id: id.clone(),
            }
        };

        let updated = match self.api.upvote(id, &client_id).await {
            Ok(updated) => updated,
            Err(ClientError::DuplicateVote(id)) => {
                // The server already counted this client; remember it.
                self.remember_upvote(&slug, &id);
                return Err(ClientError::DuplicateVote(id));
            }
            Err(e) => return Err(e),
        };

        let question = self.apply_returned(updated);
        self.remember_upvote(&slug, id);
        info!(slug = %slug, question = %id, upvotes = question.upvote_count, "question upvoted");
        Ok(question)
    }

    /// Owner only.
    pub async fn mark_answered(&self, id: &QuestionId) -> Result<Question> {
        let result = async {
            self.require_owner()?;
            let updated = self.api.mark_answered(id).await?;
            Ok::<_, ClientError>(self.apply_returned(updated))
        }
        .await;

        let question = result.map_err(|err| self.report("mark_answered", err))?;
        info!(question = %id, "question marked answered");
        Ok(question)
    }

    /// Owner only. Flips the spotlight flag of a question in the view.
    pub async fn toggle_spotlight(&self, id: &QuestionId) -> Result<Question> {
        let result = async {
            self.require_owner()?;
            let current = self
                .lock_view()
                .find(id)
                .map(Question::spotlighted)
                .ok_or_else(|| ClientError::NotFound(format!("Question {id}")))?;
            let updated = self.api.set_spotlight(id, !current).await?;
            Ok::<_, ClientError>(self.apply_returned(updated))
        }
        .await;

        let question = result.map_err(|err| self.report("toggle_spotlight", err))?;
        info!(question = %id, spotlighted = question.spotlighted(), "spotlight toggled");
        Ok(question)
    }

    /// Persist an upvote the server has counted. A failed write only costs
    /// the local duplicate check, so it is logged and not returned.
    fn remember_upvote(&self, slug: &SessionSlug, id: &QuestionId) {
        if let Err(e) = self.local.record_upvote(slug, id) {
            warn!(slug = %slug, question = %id, error = %e, "failed to persist upvote");
        }
    }

    /// Put a server-returned record into the view and notify the renderer.
    fn apply_returned(&self, updated: Question) -> Question {
        let id = updated.id.clone();
        let question = {
            let mut view = self.lock_view();
            if !view.apply_update(updated.clone()) {
                tracing::debug!(question = %id, "updated question not in view");
            }
            view.find(&id).cloned().unwrap_or(updated)
        };
        self.emit_synced();
        question
    }
}
