//! A live connection to one session.
//!
//! [`SessionClient`] bundles what every operation on a session needs: the API
//! client, local storage, the shared view state and the event sink. Its
//! methods are spread over [`crate::poller`] (the reconciliation loop) and
//! [`crate::commands`] (mutating actions).

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use askany_shared::{Question, QuestionId, Session, SessionSlug};
use askany_store::LocalState;

use crate::api::ApiClient;
use crate::error::{ClientError, Result};
use crate::events::{EventSink, ViewEvent};
use crate::reconcile::Arrangement;
use crate::state::{ClientContext, SessionView, ViewStatus};

pub struct SessionClient {
    pub(crate) api: Arc<ApiClient>,
    pub(crate) local: LocalState,
    pub(crate) view: Arc<Mutex<SessionView>>,
    pub(crate) events: EventSink,
    /// Questions with an upvote request on the wire.
    pub(crate) pending_upvotes: Mutex<HashSet<QuestionId>>,
}

impl SessionClient {
    /// Open a view on `slug`. Reads the client id and ownership flag from
    /// local storage; nothing is fetched until the first poll.
    pub fn open(
        api: Arc<ApiClient>,
        local: LocalState,
        slug: SessionSlug,
        events: EventSink,
    ) -> Result<Self> {
        let context = ClientContext {
            client_id: local.client_id()?,
            is_owner: local.is_owner(&slug)?,
        };

        tracing::debug!(
            slug = %slug,
            client = %context.client_id.short(),
            owner = context.is_owner,
            "opening session view"
        );

        Ok(Self {
            api,
            local,
            view: Arc::new(Mutex::new(SessionView::new(slug, context))),
            events,
            pending_upvotes: Mutex::new(HashSet::new()),
        })
    }

    pub fn slug(&self) -> SessionSlug {
        self.lock_view().slug.clone()
    }

    pub fn context(&self) -> ClientContext {
        self.lock_view().context.clone()
    }

    pub fn status(&self) -> ViewStatus {
        self.lock_view().status
    }

    pub fn session(&self) -> Option<Session> {
        self.lock_view().session.clone()
    }

    pub fn questions(&self) -> Vec<Question> {
        self.lock_view().questions.clone()
    }

    pub fn arrangement(&self) -> Arrangement {
        self.lock_view().arrangement()
    }

    /// Clone of the whole view, for renderers.
    pub fn snapshot(&self) -> SessionView {
        self.lock_view().clone()
    }

    pub(crate) fn lock_view(&self) -> MutexGuard<'_, SessionView> {
        // Poisoning is ignored: the view is plain data.
        self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn require_owner(&self) -> Result<()> {
        if self.lock_view().context.is_owner {
            Ok(())
        } else {
            Err(ClientError::NotOwner)
        }
    }

    /// Tell the renderer the list changed.
    pub(crate) fn emit_synced(&self) {
        let (slug, arrangement) = {
            let view = self.lock_view();
            (view.slug.clone(), view.arrangement())
        };
        self.events.emit(ViewEvent::Synced { slug, arrangement });
    }

    /// Log a failed action and show it to the user. A missing session closes
    /// the view, whichever call found out.
    pub(crate) fn report(&self, action: &'static str, err: ClientError) -> ClientError {
        tracing::warn!(action, error = %err, "session action failed");
        self.events.notice(err.notice());
        if err.is_terminal() {
            self.close_view();
        }
        err
    }

    /// Mark the view closed and tell the renderer. Returns `false` if it
    /// already was.
    pub(crate) fn close_view(&self) -> bool {
        let slug = {
            let mut view = self.lock_view();
            if view.is_closed() {
                return false;
            }
            view.close();
            view.slug.clone()
        };
        tracing::info!(slug = %slug, "session not found, closing view");
        self.events.emit(ViewEvent::Closed { slug });
        true
    }
}
