//! # shaftvisit-store
//!
//! Local persistence for the Shaftvisit client, backed by SQLite.
//!
//! The device's key-value capability is modelled by the [`KeyValueStore`]
//! trait: string keys, string values, async get/set/remove.  [`SqliteStore`]
//! is the durable implementation (one keyed-row table, JSON blobs as
//! values); [`MemoryStore`] backs tests.  The crate exposes a synchronous
//! [`Database`] handle that wraps a `rusqlite::Connection` and guarantees
//! migrations have run before any other operation.

pub mod database;
pub mod kv;
pub mod migrations;

mod error;

pub use database::Database;
pub use error::{Result, StoreError};
pub use kv::{KeyValueStore, MemoryStore, SqliteStore};
