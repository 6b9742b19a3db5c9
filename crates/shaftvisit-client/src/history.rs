//! Locally cached visit history.
//!
//! The full processed [`VisitHeader`] records live under the
//! `visitHistory` key as one JSON array, newest last.  Queued records
//! (`is_sync = false`) keep everything needed for a later resubmission;
//! [`HistoryStore::list`] flattens the array into display rows.
//!
//! The backing store has no partial-update primitive, so every mutation is
//! a read-modify-write of the whole array.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use shaftvisit_shared::constants::KEY_VISIT_HISTORY;
use shaftvisit_shared::{HistoryEntry, VisitHeader};
use shaftvisit_store::{KeyValueStore, StoreError};

/// Append-only visit history over the injected key-value store.
pub struct HistoryStore {
    store: Arc<dyn KeyValueStore>,
}

impl HistoryStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Append a processed header.  Ordering is submission order; callers
    /// reverse for newest-first display.
    pub async fn append(&self, header: &VisitHeader) -> Result<(), StoreError> {
        let mut headers = self.read_all().await?;
        headers.push(header.clone());
        self.write_all(&headers).await
    }

    /// Display rows for the whole history.
    ///
    /// History is display-only data: any read failure degrades to an empty
    /// list instead of propagating.
    pub async fn list(&self) -> Vec<HistoryEntry> {
        match self.read_all().await {
            Ok(headers) => headers.iter().map(HistoryEntry::project).collect(),
            Err(e) => {
                tracing::error!(error = %e, "failed to read visit history");
                Vec::new()
            }
        }
    }

    /// Headers still awaiting a successful remote write, oldest first.
    pub async fn pending(&self) -> Result<Vec<VisitHeader>, StoreError> {
        let headers = self.read_all().await?;
        Ok(headers.into_iter().filter(|h| !h.is_sync).collect())
    }

    /// Flip one queued record to synced after a successful retry.
    ///
    /// Returns `false` when no record with that id exists.
    pub async fn mark_synced(
        &self,
        id: Uuid,
        date_sync: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut headers = self.read_all().await?;

        let Some(header) = headers.iter_mut().find(|h| h.id == id) else {
            return Ok(false);
        };
        header.is_sync = true;
        header.date_sync = Some(date_sync);

        self.write_all(&headers).await?;
        Ok(true)
    }

    /// Remove all entries.  Test/reset path only.
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(KEY_VISIT_HISTORY).await
    }

    async fn read_all(&self) -> Result<Vec<VisitHeader>, StoreError> {
        match self.store.get(KEY_VISIT_HISTORY).await? {
            Some(json) => serde_json::from_str(&json).map_err(|e| StoreError::Corrupt {
                key: KEY_VISIT_HISTORY.to_string(),
                source: e,
            }),
            None => Ok(Vec::new()),
        }
    }

    async fn write_all(&self, headers: &[VisitHeader]) -> Result<(), StoreError> {
        let json = serde_json::to_string(headers)?;
        self.store.set(KEY_VISIT_HISTORY, &json).await
    }
}
