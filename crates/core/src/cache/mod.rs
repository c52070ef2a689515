//! SQLite-backed named cache stores.
//!
//! This module provides the host-side storage the worker writes through:
//!
//! - Stores keyed by name (`static-v1.0.7`), entries keyed by request identity
//! - Automatic schema migrations
//! - WAL mode and cascading store deletion
//! - The [`CacheStorage`] trait the worker depends on

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod storage;
pub mod stores;

pub use crate::Error;

pub use connection::CacheDb;
pub use storage::CacheStorage;
pub use stores::StoreSummary;
