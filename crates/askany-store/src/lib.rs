//! # askany-store
//!
//! Local persistence for the AskAny client.
//!
//! The client only ever needs string key-value storage (the web client used
//! browser local storage). The crate exposes the [`KeyValueStore`] trait, two
//! backends ([`MemoryStore`] and the SQLite-backed [`SqliteStore`]) and
//! [`LocalState`], which gives typed access to the keys the client uses.

pub mod database;
pub mod kv;
pub mod local_state;
pub mod migrations;

mod error;

pub use database::SqliteStore;
pub use error::{Result, StoreError};
pub use kv::{KeyValueStore, MemoryStore};
pub use local_state::LocalState;
