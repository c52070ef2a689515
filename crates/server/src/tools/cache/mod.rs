//! Cache-related MCP tools.
//!
//! This module provides tools for inspecting and clearing the named stores.

pub mod keys;
pub mod list;
pub mod purge;

pub use keys::{CacheKeysParams, keys_impl};
pub use list::list_impl;
pub use purge::{CachePurgeParams, purge_impl};
