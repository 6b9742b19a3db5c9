//! # shaftvisit-client
//!
//! The client core of Underground Visit Management: device enrollment,
//! visit drafting, and the offline-aware submission pipeline.
//!
//! The four components mirror the lifecycle of a visit record:
//!
//! 1. [`IdentityManager`] establishes the durable device identity and the
//!    one-time enrollment record.
//! 2. [`VisitRecordBuilder`] holds the in-progress draft (header plus
//!    detail lines) for one form session.
//! 3. [`SyncEngine`] consumes the draft together with current reachability
//!    and either performs the two-phase remote write (details first, header
//!    second) or queues the record for a later flush.
//! 4. [`HistoryStore`] keeps the locally cached list of processed visits.
//!
//! Each component takes its collaborators (key-value store, connectivity,
//! gateway) as injected trait objects; there is no ambient singleton.

pub mod builder;
pub mod history;
pub mod identity;
pub mod sync;

use tracing_subscriber::{fmt, EnvFilter};

pub use builder::{DetailField, HeaderField, VisitRecordBuilder};
pub use history::HistoryStore;
pub use identity::{EnrollError, EnrollmentForm, IdentityManager};
pub use sync::{FlushReport, Submission, SyncEngine, SyncError};

/// Initialise the tracing subscriber for the client process.
///
/// `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("shaftvisit_client=debug,shaftvisit_net=debug,shaftvisit_store=info,warn")
    });

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
