//! The device's persistent key-value capability.
//!
//! String keys map to string values; JSON-encoded records are stored as
//! opaque text.  Every consumer reads and writes whole values, there is no
//! partial-field update primitive, so callers read-modify-write.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::params;
use tokio::sync::Mutex;

use crate::database::Database;
use crate::error::Result;

/// Async key-value storage: the only persistence interface the client
/// components depend on.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value; `None` when the key has never been set.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write (or overwrite) a value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a key.  Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// SqliteStore
// ---------------------------------------------------------------------------

/// Durable [`KeyValueStore`] over the `kv_entries` table.
pub struct SqliteStore {
    db: Mutex<Database>,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let db = self.db.lock().await;
        let mut stmt = db
            .conn()
            .prepare("SELECT value FROM kv_entries WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;

        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let db = self.db.lock().await;
        db.conn().execute(
            "INSERT OR REPLACE INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, ?3)",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let db = self.db.lock().await;
        db.conn()
            .execute("DELETE FROM kv_entries WHERE key = ?1", params![key])?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-memory [`KeyValueStore`] for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sqlite_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("kv.db")).unwrap();
        let store = SqliteStore::new(db);

        assert_eq!(store.get("deviceId").await.unwrap(), None);

        store.set("deviceId", "DEV-1-2").await.unwrap();
        assert_eq!(
            store.get("deviceId").await.unwrap().as_deref(),
            Some("DEV-1-2")
        );

        // Overwrite wins.
        store.set("deviceId", "DEV-3-4").await.unwrap();
        assert_eq!(
            store.get("deviceId").await.unwrap().as_deref(),
            Some("DEV-3-4")
        );

        store.remove("deviceId").await.unwrap();
        assert_eq!(store.get("deviceId").await.unwrap(), None);

        // Removing again is fine.
        store.remove("deviceId").await.unwrap();
    }

    #[tokio::test]
    async fn sqlite_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kv.db");

        {
            let store = SqliteStore::new(Database::open_at(&path).unwrap());
            store.set("visitHistory", "[]").await.unwrap();
        }

        let store = SqliteStore::new(Database::open_at(&path).unwrap());
        assert_eq!(
            store.get("visitHistory").await.unwrap().as_deref(),
            Some("[]")
        );
    }

    #[tokio::test]
    async fn memory_round_trip() {
        let store = MemoryStore::new();
        store.set("k", "v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }
}
