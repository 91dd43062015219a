//! In-memory state of one mounted session view.
//!
//! [`SessionView`] is wrapped in `Arc<Mutex<>>` by [`crate::SessionClient`] so
//! the poll task and the action handlers see the same list.

use chrono::{DateTime, Utc};

use askany_shared::protocol::SessionSnapshot;
use askany_shared::{ClientId, Question, QuestionId, Session, SessionSlug};

use crate::reconcile::{self, Arrangement, ViewMode};

/// Who the acting client is, passed explicitly instead of read from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientContext {
    pub client_id: ClientId,
    pub is_owner: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewStatus {
    /// No snapshot received yet.
    Loading,
    Ready,
    /// The session was not found; nothing more will be fetched.
    Closed,
}

#[derive(Debug, Clone)]
pub struct SessionView {
    pub slug: SessionSlug,
    pub context: ClientContext,
    pub session: Option<Session>,
    pub questions: Vec<Question>,
    pub status: ViewStatus,
    pub last_synced: Option<DateTime<Utc>>,
}

impl SessionView {
    pub fn new(slug: SessionSlug, context: ClientContext) -> Self {
        Self {
            slug,
            context,
            session: None,
            questions: Vec::new(),
            status: ViewStatus::Loading,
            last_synced: None,
        }
    }

    pub fn view_mode(&self) -> ViewMode {
        ViewMode {
            is_owner: self.context.is_owner,
            mode: self.session.as_ref().map(|s| s.mode).unwrap_or_default(),
        }
    }

    pub fn arrangement(&self) -> Arrangement {
        reconcile::arrange(&self.questions, self.view_mode())
    }

    pub fn find(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| &q.id == id)
    }

    /// Replace session and questions with a fresh snapshot merged against
    /// the cached list. Returns the list to persist.
    pub fn apply_snapshot(&mut self, snapshot: SessionSnapshot, cached: &[Question]) -> &[Question] {
        self.set_session(snapshot.session);
        self.questions = reconcile::merge(&snapshot.questions, cached, &self.context.client_id);
        self.status = ViewStatus::Ready;
        self.last_synced = Some(Utc::now());
        &self.questions
    }

    pub fn set_session(&mut self, mut session: Session) {
        session.is_owner = self.context.is_owner;
        self.session = Some(session);
    }

    /// Swap in a record returned by a mutation. Ownership known locally is
    /// kept when the server response leaves `clientId` out.
    pub fn apply_update(&mut self, mut updated: Question) -> bool {
        if updated.client_id.is_none() {
            updated.client_id = self.find(&updated.id).and_then(|q| q.client_id.clone());
        }
        reconcile::stamp_ownership(&mut updated, &self.context.client_id);
        reconcile::replace_by_id(&mut self.questions, updated)
    }

    /// Show a question this client just submitted, newest first.
    pub fn add_own(&mut self, mut question: Question) {
        if question.client_id.is_none() {
            question.client_id = Some(self.context.client_id.clone());
        }
        reconcile::stamp_ownership(&mut question, &self.context.client_id);

        if !self.apply_update(question.clone()) {
            self.questions.insert(0, question);
        }
    }

    pub fn close(&mut self) {
        self.status = ViewStatus::Closed;
    }

    pub fn is_closed(&self) -> bool {
        self.status == ViewStatus::Closed
    }
}

#[cfg(test)]
mod tests {
    use askany_shared::SessionMode;

    use super::*;

    fn view(is_owner: bool) -> SessionView {
        SessionView::new(
            SessionSlug("room".into()),
            ClientContext {
                client_id: ClientId::from("c1"),
                is_owner,
            },
        )
    }

    fn question(id: i64, client: Option<&str>) -> Question {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "content": "text",
            "clientId": client,
        }))
        .unwrap()
    }

    fn snapshot(mode: &str, questions: Vec<Question>) -> SessionSnapshot {
        SessionSnapshot {
            session: serde_json::from_value(serde_json::json!({"slug": "room", "mode": mode}))
                .unwrap(),
            questions,
        }
    }

    #[test]
    fn snapshot_marks_view_ready_and_owner() {
        let mut v = view(true);
        assert_eq!(v.status, ViewStatus::Loading);

        let persisted = v
            .apply_snapshot(snapshot("spotlight", vec![question(1, None)]), &[])
            .to_vec();

        assert_eq!(persisted.len(), 1);
        assert_eq!(v.status, ViewStatus::Ready);
        assert!(v.session.as_ref().unwrap().is_owner);
        assert_eq!(v.view_mode().mode, SessionMode::Spotlight);
        assert!(v.last_synced.is_some());
    }

    #[test]
    fn snapshot_keeps_cached_own_question() {
        let mut v = view(false);
        let cached = vec![question(2, Some("c1"))];
        v.apply_snapshot(snapshot("normal", vec![question(1, None)]), &cached);

        assert_eq!(v.questions.len(), 2);
        assert!(v.find(&QuestionId::from(2)).unwrap().is_mine);
    }

    #[test]
    fn update_keeps_local_ownership() {
        let mut v = view(false);
        v.apply_snapshot(snapshot("normal", vec![question(1, Some("c1")), question(2, None)]), &[]);

        let mut returned = question(1, None);
        returned.upvote_count = 3;
        assert!(v.apply_update(returned));

        let q = v.find(&QuestionId::from(1)).unwrap();
        assert_eq!(q.upvote_count, 3);
        assert!(q.is_mine);
        assert_eq!(v.find(&QuestionId::from(2)).unwrap().upvote_count, 0);
    }

    #[test]
    fn add_own_prepends_once() {
        let mut v = view(false);
        v.apply_snapshot(snapshot("normal", vec![question(1, None)]), &[]);

        v.add_own(question(7, None));
        v.add_own(question(7, None));

        assert_eq!(v.questions.len(), 2);
        assert_eq!(v.questions[0].id, QuestionId::from(7));
        assert!(v.questions[0].is_mine);
        assert_eq!(v.questions[0].client_id, Some(ClientId::from("c1")));
    }

    #[test]
    fn close_is_sticky() {
        let mut v = view(false);
        v.close();
        assert!(v.is_closed());
    }
}
