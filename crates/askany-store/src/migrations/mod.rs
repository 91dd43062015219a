//! Database migration runner.
//!
//! Migrations are executed in order every time a [`SqliteStore`] is opened.
//! Each migration is guarded by the `user_version` pragma so it runs exactly
//! once.
//!
//! [`SqliteStore`]: crate::SqliteStore

pub mod v001_initial;

use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// Current schema version.
const CURRENT_VERSION: u32 = 1;

/// Run all pending migrations against the open connection.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let current: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    tracing::debug!(
        current_version = current,
        target_version = CURRENT_VERSION,
        "checking store migrations"
    );

    if current > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "store schema v{current} is newer than this client (v{CURRENT_VERSION})"
        )));
    }

    if current < 1 {
        tracing::info!("applying migration v001_initial");
        v001_initial::up(conn).map_err(|e| StoreError::Migration(e.to_string()))?;
        conn.pragma_update(None, "user_version", 1)?;
    }

    Ok(())
}
