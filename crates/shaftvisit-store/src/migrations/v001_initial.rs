//! v001 -- Initial schema creation.
//!
//! Creates the single `kv_entries` table backing the key-value capability.
//! Values are JSON blobs (`deviceEnrollment`, `visitHistory`) or plain
//! strings (`deviceId`).

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Key-value entries
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS kv_entries (
    key        TEXT PRIMARY KEY NOT NULL,
    value      TEXT NOT NULL,
    updated_at TEXT NOT NULL                -- ISO-8601 / RFC-3339
);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
