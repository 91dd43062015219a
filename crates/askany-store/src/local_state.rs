//! Typed access to the client's persisted keys.
//!
//! | Key                | Value                                   |
//! |--------------------|-----------------------------------------|
//! | `clientId`         | opaque client identifier                |
//! | `isOwner_{slug}`   | `"true"` when this client created it    |
//! | `questions_{slug}` | JSON list of the last rendered questions |
//! | `upvoted_{slug}`   | JSON list of question ids upvoted here  |
//!
//! Values carry no schema version. A cache entry that no longer parses is
//! logged and treated as empty.

use std::collections::BTreeSet;
use std::sync::Arc;

use askany_shared::constants::{owner_key, questions_key, upvoted_key, CLIENT_ID_KEY};
use askany_shared::{ClientId, Question, QuestionId, SessionSlug};

use crate::error::Result;
use crate::kv::KeyValueStore;

#[derive(Clone)]
pub struct LocalState {
    store: Arc<dyn KeyValueStore>,
}

impl LocalState {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// The persisted client id, generating and storing one on first use.
    pub fn client_id(&self) -> Result<ClientId> {
        if let Some(existing) = self.store.get(CLIENT_ID_KEY)? {
            if !existing.trim().is_empty() {
                return Ok(ClientId(existing));
            }
        }

        let id = ClientId::generate();
        self.store.set(CLIENT_ID_KEY, id.as_str())?;
        tracing::info!(client = %id.short(), "generated new client id");
        Ok(id)
    }

    pub fn is_owner(&self, slug: &SessionSlug) -> Result<bool> {
        Ok(self.store.get(&owner_key(slug))?.as_deref() == Some("true"))
    }

    pub fn mark_owner(&self, slug: &SessionSlug) -> Result<()> {
        self.store.set(&owner_key(slug), "true")
    }

    pub fn cached_questions(&self, slug: &SessionSlug) -> Result<Vec<Question>> {
        let key = questions_key(slug);
        let Some(raw) = self.store.get(&key)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&raw) {
            Ok(questions) => Ok(questions),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "discarding unreadable question cache");
                Ok(Vec::new())
            }
        }
    }

    pub fn save_questions(&self, slug: &SessionSlug, questions: &[Question]) -> Result<()> {
        let json = serde_json::to_string(questions)?;
        self.store.set(&questions_key(slug), &json)
    }

    pub fn upvoted(&self, slug: &SessionSlug) -> Result<BTreeSet<QuestionId>> {
        let key = upvoted_key(slug);
        let Some(raw) = self.store.get(&key)? else {
            return Ok(BTreeSet::new());
        };

        match serde_json::from_str(&raw) {
            Ok(ids) => Ok(ids),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "discarding unreadable upvote record");
                Ok(BTreeSet::new())
            }
        }
    }

    pub fn has_upvoted(&self, slug: &SessionSlug, id: &QuestionId) -> Result<bool> {
        Ok(self.upvoted(slug)?.contains(id))
    }

    pub fn record_upvote(&self, slug: &SessionSlug, id: &QuestionId) -> Result<()> {
        let mut ids = self.upvoted(slug)?;
        if ids.insert(id.clone()) {
            let json = serde_json::to_string(&ids)?;
            self.store.set(&upvoted_key(slug), &json)?;
        }
        Ok(())
    }

    /// Drop everything cached for a session that no longer exists.
    pub fn forget_session(&self, slug: &SessionSlug) -> Result<()> {
        self.store.remove(&questions_key(slug))?;
        self.store.remove(&upvoted_key(slug))?;
        self.store.remove(&owner_key(slug))?;
        Ok(())
    }
}

impl std::fmt::Debug for LocalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalState").finish_non_exhaustive()
    }
}
