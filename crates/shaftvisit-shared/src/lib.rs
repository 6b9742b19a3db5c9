//! # shaftvisit-shared
//!
//! Domain types shared by every Shaftvisit crate: the device enrollment
//! record, visit header/detail drafts, the closed catalogs (category,
//! priority, shaft, location) and the validation error type.
//!
//! Everything here is plain data; persistence lives in `shaftvisit-store`
//! and the remote write contract in `shaftvisit-net`.

pub mod constants;
pub mod models;
pub mod types;

mod error;

pub use error::FieldError;
pub use models::{DeviceIdentity, HistoryEntry, VisitDetail, VisitHeader};
pub use types::{Category, Location, Priority, Shaft, SyncState};
