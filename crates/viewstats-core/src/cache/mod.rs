//! Local persistent store for offline access.
//!
//! This module provides the `PersistentStore`: typed, keyed tables for the
//! two record kinds (users, statistics), each mirrored to a JSON file in the
//! cache directory. Every mutation runs inside a write transaction that is
//! committed whole or not at all, so readers never see a half-replaced
//! collection.

pub mod error;
pub mod records;
pub mod store;

pub use error::StoreError;
pub use records::{StatisticsRecord, UserRecord};
pub use store::{CacheAges, CachedData, PersistentStore, Record, RecordKind, Table, Tables, WriteTxn};
