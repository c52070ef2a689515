//! Host side of the client and notification boundaries.
//!
//! There is no browser behind the MCP transport, so windows and notifications
//! are tracked in memory and reported back through the status tools.

use async_trait::async_trait;
use chrono::Utc;
use schemars::JsonSchema;
use serde::Serialize;
use stalecache_core::{CacheVersion, Error};
use stalecache_worker::{ClientAction, Clients, Notification, Notifier};
use tokio::sync::RwLock;
use url::Url;

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ShownNotification {
    pub notification: Notification,
    pub shown_at: String,
}

#[derive(Debug, Clone, Default, Serialize, JsonSchema)]
pub struct HostSnapshot {
    /// Version that last claimed the clients.
    pub controller: Option<String>,
    pub windows: Vec<String>,
    pub notifications: Vec<ShownNotification>,
}

#[derive(Debug, Default)]
pub struct HostBridge {
    state: RwLock<HostSnapshot>,
}

impl HostBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> HostSnapshot {
        self.state.read().await.clone()
    }
}

#[async_trait]
impl Clients for HostBridge {
    async fn claim(&self, version: &CacheVersion) -> Result<usize, Error> {
        let mut state = self.state.write().await;
        state.controller = Some(version.to_string());
        tracing::info!(%version, clients = state.windows.len(), "clients claimed");
        Ok(state.windows.len())
    }

    async fn focus_or_open(&self, url: &Url) -> Result<ClientAction, Error> {
        let mut state = self.state.write().await;
        if state.windows.iter().any(|w| w == url.as_str()) {
            tracing::debug!(%url, "focusing existing window");
            return Ok(ClientAction::Focused);
        }
        tracing::info!(%url, "opening window");
        state.windows.push(url.to_string());
        Ok(ClientAction::Opened)
    }
}

#[async_trait]
impl Notifier for HostBridge {
    async fn show(&self, notification: &Notification) -> Result<(), Error> {
        let mut state = self.state.write().await;
        state.notifications.retain(|n| n.notification.tag != notification.tag);
        state
            .notifications
            .push(ShownNotification { notification: notification.clone(), shown_at: Utc::now().to_rfc3339() });
        tracing::info!(tag = %notification.tag, title = %notification.title, "notification shown");
        Ok(())
    }

    async fn close(&self, tag: &str) -> Result<(), Error> {
        let mut state = self.state.write().await;
        state.notifications.retain(|n| n.notification.tag != tag);
        Ok(())
    }
}
