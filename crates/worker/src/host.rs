//! Host boundary: window clients and system notifications.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stalecache_core::{CacheVersion, Error};
use url::Url;

/// What `focus_or_open` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ClientAction {
    Focused,
    Opened,
}

/// A notification as handed to the host for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub tag: String,
    /// Page opened when the notification is clicked.
    pub url: String,
}

#[async_trait]
pub trait Clients: Send + Sync {
    /// Route every open client through `version` without a reload.
    /// Returns how many clients were claimed.
    async fn claim(&self, version: &CacheVersion) -> Result<usize, Error>;

    /// Focus a client already showing `url`, otherwise open a new one.
    async fn focus_or_open(&self, url: &Url) -> Result<ClientAction, Error>;
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn show(&self, notification: &Notification) -> Result<(), Error>;

    async fn close(&self, tag: &str) -> Result<(), Error>;
}
