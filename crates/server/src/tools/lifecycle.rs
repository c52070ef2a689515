//! sw_update, sw_activate and sw_status tool implementations.
//!
//! Deploying a new cache version is an update: the worker for that version is
//! installed and then activated (immediately, or later via sw_activate when it
//! does not skip waiting).

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use stalecache_core::InstallPolicy;
use stalecache_worker::{ActivateReport, RegistrationStatus, WorkerState};

use super::json_result;
use crate::host::HostSnapshot;
use crate::state::AppState;

/// Parameters for the sw_update tool. Omitted fields keep the configured value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SwUpdateParams {
    /// Cache version tag to deploy (e.g. "v1.0.8").
    #[serde(default)]
    pub version: Option<String>,

    /// Replacement asset manifest.
    #[serde(default)]
    pub manifest: Option<Vec<String>>,

    /// Activate without waiting for sw_activate.
    #[serde(default)]
    pub skip_waiting: Option<bool>,

    /// "atomic" or "best-effort".
    #[serde(default)]
    pub install_policy: Option<InstallPolicy>,
}

/// Implementation of the sw_update tool.
pub async fn update_impl(state: &AppState, params: SwUpdateParams) -> Result<CallToolResult, McpError> {
    let mut config = state.config.clone();
    if let Some(version) = params.version {
        config.cache_version = version;
    }
    if let Some(manifest) = params.manifest {
        config.manifest = manifest;
    }
    if let Some(skip_waiting) = params.skip_waiting {
        config.skip_waiting = skip_waiting;
    }
    if let Some(policy) = params.install_policy {
        config.install_policy = policy;
    }

    let worker = state.build_worker(&config)?;
    let report = state.registration.update(worker).await?;
    Ok(json_result(&report)?)
}

/// Output from the sw_activate tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SwActivateOutput {
    /// Whether a waiting version existed.
    pub activated: bool,
    pub report: Option<ActivateReport>,
}

/// Implementation of the sw_activate tool.
pub async fn activate_impl(state: &AppState) -> Result<CallToolResult, McpError> {
    let report = state.registration.activate_waiting().await?;
    Ok(json_result(&SwActivateOutput { activated: report.is_some(), report })?)
}

/// Output from the sw_status tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SwStatusOutput {
    pub registration: RegistrationStatus,
    pub active_state: Option<WorkerState>,
    pub host: HostSnapshot,
}

/// Implementation of the sw_status tool.
pub async fn status_impl(state: &AppState) -> Result<CallToolResult, McpError> {
    let active_state = match state.registration.active().await {
        Some(worker) => Some(worker.state().await),
        None => None,
    };
    let output =
        SwStatusOutput { registration: state.registration.status().await, active_state, host: state.host.snapshot().await };
    Ok(json_result(&output)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing;
    use crate::tools::parse_result;

    #[tokio::test]
    async fn test_update_deploys_new_version() {
        let (state, _) = testing::state().await;
        state.boot().await.unwrap();

        let params = SwUpdateParams { version: Some("v2".into()), ..Default::default() };
        let output: serde_json::Value = parse_result(&update_impl(&state, params).await.unwrap());

        assert_eq!(output["version"], "v2");
        assert_eq!(output["install"]["cached"], 2);
        assert_eq!(output["activate"]["deleted"][0], "static-v1");
        assert_eq!(state.caches.store_names().await.unwrap(), vec!["static-v2"]);
    }

    #[tokio::test]
    async fn test_update_waits_then_activates() {
        let (state, _) = testing::state().await;
        state.boot().await.unwrap();

        let params = SwUpdateParams { version: Some("v2".into()), skip_waiting: Some(false), ..Default::default() };
        let output: serde_json::Value = parse_result(&update_impl(&state, params).await.unwrap());
        assert!(output["activate"].is_null());

        let status: serde_json::Value = parse_result(&status_impl(&state).await.unwrap());
        assert_eq!(status["registration"]["active"], "v1");
        assert_eq!(status["registration"]["waiting"], "v2");
        assert_eq!(status["active_state"], "active");

        let activated: serde_json::Value = parse_result(&activate_impl(&state).await.unwrap());
        assert_eq!(activated["activated"], true);
        assert_eq!(state.active_worker().await.unwrap().version().as_str(), "v2");
    }

    #[tokio::test]
    async fn test_update_atomic_failure_is_an_error() {
        let (state, _) = testing::state().await;
        state.boot().await.unwrap();

        let params = SwUpdateParams {
            version: Some("v2".into()),
            manifest: Some(vec!["/".into(), "/missing.png".into()]),
            ..Default::default()
        };
        let err = update_impl(&state, params).await.unwrap_err();

        assert_eq!(err.code.0, -32006);
        assert_eq!(state.active_worker().await.unwrap().version().as_str(), "v1");
    }

    #[tokio::test]
    async fn test_update_best_effort_skips_missing() {
        let (state, _) = testing::state().await;

        let params = SwUpdateParams {
            manifest: Some(vec!["/".into(), "/missing.png".into()]),
            install_policy: Some(InstallPolicy::BestEffort),
            ..Default::default()
        };
        let output: serde_json::Value = parse_result(&update_impl(&state, params).await.unwrap());

        assert_eq!(output["install"]["cached"], 1);
        assert_eq!(output["install"]["failed"][0], "https://www.example.com/missing.png");
    }

    #[tokio::test]
    async fn test_activate_without_waiting_version() {
        let (state, _) = testing::state().await;
        let output: serde_json::Value = parse_result(&activate_impl(&state).await.unwrap());
        assert_eq!(output["activated"], false);
    }
}
