//! The reconciliation loop.
//!
//! One tick: fetch the session snapshot, merge it with the cached list,
//! update the view, persist the merged list, notify the renderer. A tokio
//! task repeats the tick on a fixed interval until the session disappears or
//! the view is torn down.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::commands::session::fetch_stats;
use crate::error::{ClientError, Result};
use crate::events::{EventSink, ViewEvent};
use crate::session::SessionClient;

/// What a single poll tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The view now shows `count` questions.
    Synced { count: usize },
    /// The fetch failed; the previous list is still shown.
    Failed,
    /// The session is gone. No further polls.
    Closed,
}

impl SessionClient {
    /// Fetch and merge once, without notices. Returns the merged list length.
    pub async fn refresh(&self) -> Result<usize> {
        let (slug, client_id) = {
            let view = self.lock_view();
            if view.is_closed() {
                return Err(ClientError::SessionNotFound(view.slug.clone()));
            }
            (view.slug.clone(), view.context.client_id.clone())
        };

        let snapshot = self.api.fetch_session(&slug, &client_id).await?;
        let cached = self.local.cached_questions(&slug)?;

        let merged = {
            let mut view = self.lock_view();
            view.apply_snapshot(snapshot, &cached).to_vec()
        };

        if let Err(e) = self.local.save_questions(&slug, &merged) {
            warn!(slug = %slug, error = %e, "failed to persist question cache");
        }

        debug!(slug = %slug, count = merged.len(), "session synced");
        self.emit_synced();
        Ok(merged.len())
    }

    /// One tick of the loop. Failures are logged and shown as notices; a
    /// missing session closes the view.
    pub async fn poll_once(&self) -> PollOutcome {
        match self.refresh().await {
            Ok(count) => PollOutcome::Synced { count },
            Err(err) if err.is_terminal() => {
                if !self.lock_view().is_closed() {
                    self.events.notice(err.notice());
                    self.close_view();
                }
                PollOutcome::Closed
            }
            Err(err) => {
                warn!(slug = %self.slug(), error = %err, "session poll failed");
                self.events.notice(err.notice());
                PollOutcome::Failed
            }
        }
    }

    /// Poll now and then every `interval` on a background task.
    pub fn start_polling(self: &Arc<Self>, interval: Duration) -> PollHandle {
        let session = Arc::clone(self);
        PollHandle::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if session.poll_once().await == PollOutcome::Closed {
                    break;
                }
            }
        })
    }
}

/// Refresh stats now and then every `interval`, emitting [`ViewEvent::Stats`].
pub fn start_stats_polling(api: Arc<ApiClient>, interval: Duration, events: EventSink) -> PollHandle {
    PollHandle::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let stats = fetch_stats(&api).await;
            events.emit(ViewEvent::Stats(stats));
        }
    })
}

/// Owner of a background poll task. Stopping or dropping the handle cancels
/// the task, including a fetch in flight.
pub struct PollHandle {
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    fn spawn<F>(work: F) -> Self
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let (shutdown, mut rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            tokio::select! {
                _ = work => debug!("poll loop finished"),
                _ = wait_for_shutdown(&mut rx) => debug!("poll loop cancelled"),
            }
        });
        Self {
            shutdown,
            task: Some(task),
        }
    }

    /// Whether the loop has ended on its own (e.g. the session closed).
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Wait for the loop to end without cancelling it.
    pub async fn finished(&mut self) {
        if let Some(task) = self.task.as_mut() {
            if let Err(e) = task.await {
                warn!(error = %e, "poll task panicked");
            }
            self.task = None;
        }
    }

    /// Cancel the loop and wait for the task to exit.
    pub async fn stop(self) {
        let Self { shutdown, task } = self;
        let _ = shutdown.send(true);
        let Some(task) = task else {
            return;
        };
        if let Err(e) = task.await {
            if !e.is_cancelled() {
                warn!(error = %e, "poll task panicked");
            }
        }
    }
}

/// Resolves once shutdown is requested or every sender is gone.
async fn wait_for_shutdown(rx: &mut watch::Receiver<bool>) {
    while !*rx.borrow_and_update() {
        if rx.changed().await.is_err() {
            return;
        }
    }
}
