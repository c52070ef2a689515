//! Auxiliary events: background sync, push, notification click and error reporting.

use serde::{Deserialize, Serialize};
use stalecache_core::{Error, uri};

use crate::host::{ClientAction, Notification};
use crate::worker::Worker;

/// The only sync tag this worker answers.
pub const SYNC_TAG: &str = "background-sync";

pub const NOTIFICATION_ICON: &str = "/assets/images/icon-192.png";
pub const NOTIFICATION_BADGE: &str = "/assets/images/favicon.svg";
pub const NOTIFICATION_VIBRATE: [u32; 3] = [100, 50, 100];
pub const DEFAULT_PUSH_BODY: &str = "New content is available";
pub const DEFAULT_PUSH_TAG: &str = "stalecache-update";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, schemars::JsonSchema)]
pub struct SyncReport {
    pub tag: String,
    /// Entries re-fetched and overwritten.
    pub refreshed: usize,
    /// Entries whose refresh failed; the stored copy is kept.
    pub failed: usize,
    /// The tag was not recognised and nothing ran.
    pub skipped: bool,
}

/// Push message body. Every field is optional.
#[derive(Debug, Default, Deserialize)]
struct PushPayload {
    title: Option<String>,
    body: Option<String>,
    url: Option<String>,
    tag: Option<String>,
}

impl PushPayload {
    /// JSON object if it parses as one, otherwise the whole text is the body.
    fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
            return Self::default();
        };
        match serde_json::from_str::<PushPayload>(raw) {
            Ok(payload) => payload,
            Err(_) => Self { body: Some(raw.to_string()), ..Self::default() },
        }
    }
}

impl Worker {
    /// Background sync: re-fetch every entry in the current stores.
    pub async fn sync(&self, tag: &str) -> Result<SyncReport, Error> {
        if tag != SYNC_TAG {
            tracing::debug!(tag, "ignoring unknown sync tag");
            return Ok(SyncReport { tag: tag.to_string(), skipped: true, ..Default::default() });
        }

        let mut report = SyncReport { tag: tag.to_string(), ..Default::default() };
        for store in self.settings.stores.iter() {
            let keys = match self.ctx.caches.keys(store).await {
                Ok(keys) => keys,
                Err(e) => {
                    tracing::warn!(store, error = %e, "failed to list entries for sync");
                    continue;
                }
            };

            for request in keys {
                match self.ctx.network.fetch(&request).await {
                    Ok(response) if self.ctx.store_if_ok(store, &request, &response).await => report.refreshed += 1,
                    Ok(response) => {
                        tracing::warn!(url = %request.url(), status = response.status, "sync refresh not stored");
                        report.failed += 1;
                    }
                    Err(e) => {
                        tracing::warn!(url = %request.url(), error = %e, "sync refresh failed");
                        report.failed += 1;
                    }
                }
            }
        }

        tracing::info!(refreshed = report.refreshed, failed = report.failed, "background sync finished");
        Ok(report)
    }

    /// Push: build a notification from the payload and show it.
    ///
    /// A display failure is logged; the notification is still returned.
    pub async fn push(&self, payload: Option<&str>) -> Notification {
        let payload = PushPayload::parse(payload);
        let notification = Notification {
            title: payload.title.unwrap_or_else(|| self.settings.site_name.clone()),
            body: payload.body.unwrap_or_else(|| DEFAULT_PUSH_BODY.to_string()),
            icon: NOTIFICATION_ICON.to_string(),
            badge: NOTIFICATION_BADGE.to_string(),
            vibrate: NOTIFICATION_VIBRATE.to_vec(),
            tag: payload.tag.unwrap_or_else(|| DEFAULT_PUSH_TAG.to_string()),
            url: payload.url.unwrap_or_else(|| "/".to_string()),
        };

        if let Err(e) = self.notifier.show(&notification).await {
            self.on_error("push", &e);
        }
        notification
    }

    /// Notification click: close it, then focus or open the target page.
    ///
    /// `url` may be root-relative; it defaults to the site root.
    pub async fn notification_click(&self, tag: Option<&str>, url: Option<&str>) -> Result<ClientAction, Error> {
        if let Some(tag) = tag
            && let Err(e) = self.notifier.close(tag).await
        {
            self.on_error("notificationclick", &e);
        }

        let target = uri::normalize(url.unwrap_or("/"), Some(&self.settings.origin))
            .map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let action = self.clients.focus_or_open(&target).await?;
        tracing::info!(url = %target, ?action, "notification clicked");
        Ok(action)
    }

    /// Error and unhandled-failure reporting. Logs only.
    pub fn on_error(&self, context: &str, error: &dyn std::error::Error) {
        tracing::error!(version = %self.settings.version, context, error = %error, "unhandled failure");
    }
}
