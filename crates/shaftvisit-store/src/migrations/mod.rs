//! Schema migrations.
//!
//! Applied sequentially whenever a database is opened, tracked through
//! SQLite's `user_version` pragma: a database at version N has every
//! migration up to N applied.  A database reporting a version newer than
//! this build knows about is refused rather than silently reinterpreted.

pub mod v001_initial;

use rusqlite::Connection;

use crate::error::{Result, StoreError};

type Migration = fn(&Connection) -> std::result::Result<(), rusqlite::Error>;

/// Ordered migrations; entry `i` upgrades schema version `i` to `i + 1`.
const MIGRATIONS: [Migration; 1] = [v001_initial::up];

/// Schema version a freshly migrated database reports.
pub const CURRENT_VERSION: u32 = MIGRATIONS.len() as u32;

/// Bring the open connection up to [`CURRENT_VERSION`].
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let applied: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if applied as usize > MIGRATIONS.len() {
        return Err(StoreError::Migration(format!(
            "database is at schema version {applied}, newer than this build supports"
        )));
    }

    for (i, migrate) in MIGRATIONS.iter().enumerate().skip(applied as usize) {
        let target = i as u32 + 1;
        tracing::info!(version = target, "applying schema migration");

        migrate(conn).map_err(|e| StoreError::Migration(format!("v{target:03}: {e}")))?;
        conn.pragma_update(None, "user_version", target)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version_of(conn: &Connection) -> u32 {
        conn.pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn migrating_twice_is_a_noop() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(version_of(&conn), CURRENT_VERSION);
    }

    #[test]
    fn newer_database_is_refused() {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "user_version", CURRENT_VERSION + 1)
            .unwrap();

        let err = run_migrations(&conn).unwrap_err();
        assert!(matches!(err, StoreError::Migration(_)));
    }
}
