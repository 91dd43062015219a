//! Session-level actions: create, switch mode, stats.

use tracing::{info, warn};

use askany_shared::{Session, SessionMode, SessionSlug, Stats};
use askany_store::LocalState;

use crate::api::ApiClient;
use crate::error::{ClientError, Result};
use crate::events::Notice;
use crate::session::SessionClient;

/// Create a session and remember this client as its owner.
pub async fn create_session(api: &ApiClient, local: &LocalState) -> Result<SessionSlug> {
    let slug = api.create_session().await?;
    local.mark_owner(&slug)?;
    info!(slug = %slug, "session created, client is owner");
    Ok(slug)
}

/// Aggregate counters. Never fails: an unreachable endpoint yields zeroed
/// stats stamped now.
pub async fn fetch_stats(api: &ApiClient) -> Stats {
    match api.fetch_stats().await {
        Ok(stats) => stats,
        Err(e) => {
            warn!(error = %e, "failed to fetch stats");
            Stats::empty()
        }
    }
}

impl SessionClient {
    /// Owner only. A missing session closes the view.
    pub async fn set_mode(&self, mode: SessionMode) -> Result<Session> {
        let result = async {
            self.require_owner()?;
            let slug = self.slug();
            let session = self.api.set_mode(&slug, mode).await?;
            let session = {
                let mut view = self.lock_view();
                view.set_session(session);
                view.session.clone()
            };
            self.emit_synced();
            session.ok_or_else(|| ClientError::Decode("session missing after update".into()))
        }
        .await;

        let session = result.map_err(|err| self.report("set_mode", err))?;
        info!(slug = %session.slug, mode = %session.mode, "session mode changed");
        self.events
            .notice(Notice::info(format!("Session is now in {} mode", session.mode)));
        Ok(session)
    }

    /// Owner only. Switches between normal and spotlight mode.
    pub async fn toggle_mode(&self) -> Result<Session> {
        let current = self.session().map(|s| s.mode).unwrap_or_default();
        self.set_mode(current.toggled()).await
    }
}
