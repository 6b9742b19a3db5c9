//! The submission pipeline.
//!
//! A draft moves through a fixed set of states:
//!
//! ```text
//! Draft -> Validating -> Rejected
//!                     -> Submitting -> Synced
//!                                   -> QueuedOffline
//!                                   -> Failed
//! ```
//!
//! The remote write is two-phase: the detail batch must be acknowledged
//! before the header is sent, so the backend never sees a header whose
//! details are missing.  The reverse can happen (details written, header
//! write lost); the record is queued locally and the orphaned details are
//! left for the backend to reconcile on resubmission.
//!
//! Every terminal state except `Rejected` consumes the draft: the builder
//! is reset and the record lands in history, either synced or queued.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use shaftvisit_net::{Connectivity, DetailPayload, GatewayError, HeaderPayload, VisitGateway};
use shaftvisit_shared::{FieldError, SyncState, VisitHeader};
use shaftvisit_store::StoreError;

use crate::builder::VisitRecordBuilder;
use crate::history::HistoryStore;

/// Successful resolution of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Both remote writes acknowledged.
    Synced { date_sync: DateTime<Utc> },
    /// Device offline; the record is in history awaiting a flush.
    QueuedOffline,
}

/// Failed resolution of a submission.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Validation found missing fields; the draft is untouched.
    #[error("{}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Rejected(Vec<FieldError>),

    /// The detail batch write failed; nothing reached the backend and the
    /// record was queued.
    #[error("visit details write failed")]
    DetailWrite(#[source] GatewayError),

    /// The header write failed after the details were acknowledged; the
    /// record was queued.
    #[error("visit header write failed")]
    HeaderWrite(#[source] GatewayError),

    /// The local queue write failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of one [`SyncEngine::flush_pending`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Records whose retry succeeded this pass.
    pub synced: usize,
    /// Records whose retry failed; they stay queued.
    pub failed: usize,
    /// Records still queued after the pass.
    pub pending: usize,
}

/// Drives a draft through validation, the two-phase remote write, and into
/// history.
pub struct SyncEngine {
    gateway: Arc<dyn VisitGateway>,
    connectivity: Arc<dyn Connectivity>,
    history: HistoryStore,
}

impl SyncEngine {
    pub fn new(
        gateway: Arc<dyn VisitGateway>,
        connectivity: Arc<dyn Connectivity>,
        history: HistoryStore,
    ) -> Self {
        Self {
            gateway,
            connectivity,
            history,
        }
    }

    /// Submit the current draft.
    ///
    /// On [`SyncError::Rejected`] the draft is left as-is for correction.
    /// Every other outcome consumes it: the record is appended to history
    /// (synced or queued) and the builder starts a fresh draft.
    pub async fn submit(&self, builder: &mut VisitRecordBuilder) -> Result<Submission, SyncError> {
        let visit_id = builder.draft().id;
        transition(visit_id, SyncState::Draft, SyncState::Validating);

        let errors = builder.validate();
        if !errors.is_empty() {
            transition(visit_id, SyncState::Validating, SyncState::Rejected);
            return Err(SyncError::Rejected(errors));
        }

        if !self.connectivity.fetch_now().await.is_connected {
            transition(visit_id, SyncState::Validating, SyncState::QueuedOffline);
            self.queue(builder).await?;
            return Ok(Submission::QueuedOffline);
        }

        transition(visit_id, SyncState::Validating, SyncState::Submitting);
        let now = Utc::now();

        match self.write_remote(builder.draft(), now).await {
            Ok(()) => {
                transition(visit_id, SyncState::Submitting, SyncState::Synced);

                let mut header = builder.draft().clone();
                header.is_sync = true;
                header.date_sync = Some(now);
                for detail in &mut header.visit_details {
                    detail.transaction_date = now;
                }
                self.history.append(&header).await?;
                builder.reset();

                tracing::info!(%visit_id, "visit synced");
                Ok(Submission::Synced { date_sync: now })
            }
            Err(e) => {
                transition(visit_id, SyncState::Submitting, SyncState::Failed);
                self.queue(builder).await?;
                Err(e)
            }
        }
    }

    /// Retry every queued record, oldest first.
    ///
    /// Stops early when the device goes offline mid-pass; whatever is left
    /// stays queued for the next trigger.
    pub async fn flush_pending(&self) -> Result<FlushReport, StoreError> {
        let queued = self.history.pending().await?;
        let mut report = FlushReport {
            pending: queued.len(),
            ..FlushReport::default()
        };

        if queued.is_empty() {
            return Ok(report);
        }
        tracing::info!(queued = queued.len(), "flushing queued visits");

        for header in &queued {
            if !self.connectivity.fetch_now().await.is_connected {
                tracing::info!("offline mid-flush, stopping");
                break;
            }

            let now = Utc::now();
            match self.write_remote(header, now).await {
                Ok(()) => {
                    self.history.mark_synced(header.id, now).await?;
                    report.synced += 1;
                    report.pending -= 1;
                    tracing::info!(visit_id = %header.id, "queued visit synced");
                }
                Err(e) => {
                    report.failed += 1;
                    let timed_out = matches!(
                        &e,
                        SyncError::DetailWrite(g) | SyncError::HeaderWrite(g) if g.is_timeout()
                    );
                    tracing::warn!(
                        visit_id = %header.id,
                        error = %e,
                        timed_out,
                        "queued visit retry failed"
                    );
                }
            }
        }

        Ok(report)
    }

    /// The two-phase write.  Details first; the header is only attempted
    /// once the whole batch is acknowledged.
    async fn write_remote(
        &self,
        header: &VisitHeader,
        now: DateTime<Utc>,
    ) -> Result<(), SyncError> {
        let details: Vec<DetailPayload> = header
            .visit_details
            .iter()
            .map(|d| {
                let mut payload = DetailPayload::from(d);
                payload.transaction_date = now;
                payload
            })
            .collect();

        self.gateway
            .submit_details(&details)
            .await
            .map_err(SyncError::DetailWrite)?;

        self.gateway
            .submit_header(&HeaderPayload::from_header(header, now))
            .await
            .map_err(|e| {
                // The details of this visit are already on the backend with
                // no header; resubmission will send them again.
                tracing::warn!(
                    visit_id = %header.id,
                    error = %e,
                    "header write failed after details were acknowledged"
                );
                SyncError::HeaderWrite(e)
            })
    }

    /// Park the draft in history as unsynced and start a fresh one.
    async fn queue(&self, builder: &mut VisitRecordBuilder) -> Result<(), StoreError> {
        let mut header = builder.draft().clone();
        header.is_sync = false;
        header.date_sync = None;

        self.history.append(&header).await?;
        builder.reset();

        tracing::info!(visit_id = %header.id, "visit queued for later sync");
        Ok(())
    }
}

fn transition(visit_id: uuid::Uuid, from: SyncState, to: SyncState) {
    tracing::debug!(%visit_id, ?from, ?to, "sync state transition");
}
