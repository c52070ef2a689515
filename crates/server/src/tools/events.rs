//! sw_sync, sw_push and sw_notification_click tool implementations.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use stalecache_worker::{ClientAction, Notification, SYNC_TAG};

use super::json_result;
use crate::state::AppState;

/// Parameters for the sw_sync tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwSyncParams {
    /// Sync tag (default: "background-sync").
    #[serde(default = "default_tag")]
    pub tag: String,
}

fn default_tag() -> String {
    SYNC_TAG.into()
}

/// Implementation of the sw_sync tool.
pub async fn sync_impl(state: &AppState, params: SwSyncParams) -> Result<CallToolResult, McpError> {
    let worker = state.active_worker().await?;
    let report = worker.sync(&params.tag).await?;
    Ok(json_result(&report)?)
}

/// Parameters for the sw_push tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SwPushParams {
    /// Push message data: a JSON object with optional title, body, url and tag,
    /// or plain text used as the body.
    #[serde(default)]
    pub payload: Option<String>,
}

/// Output from the sw_push tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SwPushOutput {
    pub notification: Notification,
}

/// Implementation of the sw_push tool.
pub async fn push_impl(state: &AppState, params: SwPushParams) -> Result<CallToolResult, McpError> {
    let worker = state.active_worker().await?;
    let notification = worker.push(params.payload.as_deref()).await;
    Ok(json_result(&SwPushOutput { notification })?)
}

/// Parameters for the sw_notification_click tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SwNotificationClickParams {
    /// Tag of the clicked notification.
    #[serde(default)]
    pub tag: Option<String>,

    /// Page to focus or open (default: site root).
    #[serde(default)]
    pub url: Option<String>,
}

/// Output from the sw_notification_click tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SwNotificationClickOutput {
    pub action: ClientAction,
}

/// Implementation of the sw_notification_click tool.
pub async fn notification_click_impl(
    state: &AppState, params: SwNotificationClickParams,
) -> Result<CallToolResult, McpError> {
    let worker = state.active_worker().await?;
    let action = worker
        .notification_click(params.tag.as_deref(), params.url.as_deref())
        .await?;
    Ok(json_result(&SwNotificationClickOutput { action })?)
}
