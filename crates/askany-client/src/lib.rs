//! # askany-client
//!
//! Client for AskAny live Q&A sessions.
//!
//! A mounted session is a [`SessionClient`]: it polls the REST API on a fixed
//! interval, merges each snapshot with the questions this client submitted
//! (see [`reconcile::merge`]), persists the result through a
//! [`askany_store::KeyValueStore`], and reports changes as [`ViewEvent`]s.
//! Mutating actions live in [`commands`].

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod poller;
pub mod reconcile;
pub mod render;
pub mod session;
pub mod state;

pub use api::ApiClient;
pub use commands::questions::QuestionDraft;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use events::{EventSink, Notice, NoticeLevel, ViewEvent};
pub use poller::{PollHandle, PollOutcome};
pub use reconcile::{Arrangement, ViewMode};
pub use session::SessionClient;
pub use state::{ClientContext, SessionView, ViewStatus};
