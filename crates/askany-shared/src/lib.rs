//! # askany-shared
//!
//! Types shared by every AskAny crate: identifiers, the session and question
//! records exchanged with the REST API, request/response bodies, and the
//! names of the keys the client persists locally.

pub mod constants;
pub mod error;
pub mod models;
pub mod protocol;
pub mod types;

pub use error::ProtocolError;
pub use models::{Question, Session, Stats};
pub use types::{ClientId, QuestionId, SessionMode, SessionSlug};
