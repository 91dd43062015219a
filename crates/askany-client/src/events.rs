use serde::Serialize;
use tokio::sync::mpsc;

use askany_shared::{SessionSlug, Stats};

use crate::reconcile::Arrangement;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// A non-blocking message for the user (a toast in the web client).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }
}

/// Everything a session view tells its renderer.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ViewEvent {
    /// The rendered list changed.
    Synced {
        slug: SessionSlug,
        arrangement: Arrangement,
    },
    Notice(Notice),
    /// The session is gone; the renderer should navigate to session creation.
    Closed { slug: SessionSlug },
    Stats(Stats),
}

/// Sending half of a view's event stream. Cloned into every task that
/// reports to the renderer.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: Option<mpsc::UnboundedSender<ViewEvent>>,
}

impl EventSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ViewEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A sink that drops every event.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn emit(&self, event: ViewEvent) {
        let Some(tx) = &self.tx else {
            return;
        };
        if tx.send(event).is_err() {
            tracing::debug!("view event dropped, renderer is gone");
        }
    }

    pub fn notice(&self, notice: Notice) {
        self.emit(ViewEvent::Notice(notice));
    }
}
