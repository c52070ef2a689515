//! The offline caching worker.
//!
//! This crate provides:
//! - Request routing to one of three fetch strategies
//! - Install/activate lifecycle with versioned store eviction
//! - Registration of waiting and active worker versions
//! - Background sync, push and notification click handlers
//! - Host boundary traits for window clients and notifications

pub mod event;
pub mod handlers;
pub mod host;
pub mod lifecycle;
pub mod registration;
pub mod route;
pub mod strategy;
pub mod worker;

#[cfg(test)]
mod testing;

pub use event::{SettleReport, WaitUntil};
pub use handlers::{SYNC_TAG, SyncReport};
pub use host::{ClientAction, Clients, Notification, Notifier};
pub use lifecycle::{ActivateReport, InstallReport, WorkerState};
pub use registration::{Registration, RegistrationStatus, UpdateReport};
pub use route::{Route, Router};
pub use strategy::{ResponseSource, Served, StrategyContext};
pub use worker::{FetchOutcome, Worker, WorkerSettings};
