//! v001 -- Initial schema creation.
//!
//! A single `kv` table standing in for browser local storage.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS kv (
    key        TEXT PRIMARY KEY NOT NULL,   -- e.g. clientId, questions_<slug>
    value      TEXT NOT NULL,               -- plain string or JSON
    updated_at TEXT NOT NULL                -- SQLite datetime('now')
);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
