//! sw_fetch tool implementation.
//!
//! Dispatches a request through the active worker, exactly as a page's fetch
//! event would, and waits for any background revalidation before returning.

use std::collections::BTreeMap;

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use stalecache_core::{Request, Response};
use stalecache_worker::{ResponseSource, Route, SettleReport};

use super::json_result;
use crate::state::AppState;

/// Parameters for the sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchParams {
    /// Absolute URL, or a path resolved against the site origin.
    pub url: String,

    /// HTTP method (default: GET). Anything but GET bypasses the worker.
    #[serde(default = "default_method")]
    pub method: String,

    /// Extra request headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Maximum characters of body text returned (default: 65536).
    #[serde(default = "default_max_body_chars")]
    pub max_body_chars: usize,
}

fn default_method() -> String {
    "GET".into()
}

fn default_max_body_chars() -> usize {
    64 * 1024
}

/// Output from the sw_fetch tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SwFetchOutput {
    pub url: String,
    pub route: Route,
    /// Where the response came from; absent when the request passed through.
    pub source: Option<ResponseSource>,
    pub status: u16,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub body_bytes: usize,
    pub body_truncated: bool,
    /// Outcome of revalidation work started by this fetch.
    pub background: SettleReport,
}

fn truncate_chars(text: &str, max: usize) -> (String, bool) {
    match text.char_indices().nth(max) {
        Some((idx, _)) => (text[..idx].to_string(), true),
        None => (text.to_string(), false),
    }
}

/// Implementation of the sw_fetch tool.
pub async fn fetch_impl(state: &AppState, params: SwFetchParams) -> Result<CallToolResult, McpError> {
    let origin = state.config.origin_url().ok();
    let mut request = Request::parse(&params.method, &params.url, origin.as_ref())?;
    for (name, value) in params.headers {
        request = request.with_header(name, value);
    }

    let outcome = state.registration.fetch(&request).await;
    let (response, source): (Response, _) = match outcome.served {
        Some(served) => (served.response, Some(served.source)),
        None => (state.network.fetch(&request).await?, None),
    };
    let background = outcome.wait_until.settle().await;

    let (body, body_truncated) = truncate_chars(&response.text(), params.max_body_chars);
    let output = SwFetchOutput {
        url: request.url().to_string(),
        route: outcome.route,
        source,
        status: response.status,
        content_type: response.content_type().map(str::to_string),
        body_bytes: response.body.len(),
        headers: response.headers,
        body,
        body_truncated,
        background,
    };

    Ok(json_result(&output)?)
}
