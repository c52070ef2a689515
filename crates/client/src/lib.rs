//! Network client for stalecache.
//!
//! This crate provides the reqwest-backed implementation of the worker's
//! network boundary.

pub mod fetch;

pub use fetch::{FetchClient, FetchConfig};
