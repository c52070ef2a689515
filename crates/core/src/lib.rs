//! Core types and shared functionality for stalecache.
//!
//! This crate provides:
//! - Request/response model and versioned store naming
//! - Cache storage boundary with a SQLite backend
//! - Network boundary trait
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod manifest;
pub mod model;
pub mod network;
pub mod uri;

pub use cache::{CacheDb, CacheStorage, StoreSummary};
pub use config::{AppConfig, ConfigError, InstallPolicy};
pub use error::Error;
pub use manifest::AssetManifest;
pub use model::{CacheVersion, Request, Response, StoreNames, StoreRole, Strategy};
pub use network::Network;
