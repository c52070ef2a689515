//! Install and activate: pre-caching the manifest and sweeping old generations.

use std::sync::Arc;

use serde::Serialize;
use stalecache_core::{Error, InstallPolicy, Request, Response};

use crate::worker::Worker;

/// Lifecycle of one worker version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum WorkerState {
    Installing,
    /// Installed, waiting for the previous version to let go.
    Waiting,
    Active,
    /// Replaced by a newer active version.
    Superseded,
    /// Install failed; this version never activates.
    Redundant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, schemars::JsonSchema)]
pub struct InstallReport {
    pub store: String,
    pub cached: usize,
    /// Manifest entries that could not be cached (best-effort only).
    pub failed: Vec<String>,
    pub skip_waiting: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, schemars::JsonSchema)]
pub struct ActivateReport {
    pub deleted: Vec<String>,
    /// Stores whose deletion failed; they are retried at the next activation.
    pub failed: Vec<String>,
    pub claimed: usize,
}

impl Worker {
    async fn set_state(&self, next: WorkerState) {
        let mut state = self.state.write().await;
        if *state != next {
            tracing::info!(version = %self.settings.version, from = ?*state, to = ?next, "worker state change");
            *state = next;
        }
    }

    /// Fetch every manifest entry concurrently, in manifest order.
    async fn fetch_manifest(&self) -> (Vec<(Request, Response)>, Vec<String>) {
        let handles: Vec<_> = self
            .settings
            .manifest
            .requests()
            .map(|request| {
                let network = Arc::clone(&self.ctx.network);
                tokio::spawn(async move {
                    let result = network.fetch(&request).await;
                    (request, result)
                })
            })
            .collect();

        let mut fetched = Vec::with_capacity(handles.len());
        let mut failed = Vec::new();
        for handle in handles {
            match handle.await {
                Ok((request, Ok(response))) if response.is_ok() => fetched.push((request, response)),
                Ok((request, Ok(response))) => {
                    tracing::warn!(url = %request.url(), status = response.status, "manifest asset returned an error status");
                    failed.push(request.url().to_string());
                }
                Ok((request, Err(e))) => {
                    tracing::warn!(url = %request.url(), error = %e, "failed to fetch manifest asset");
                    failed.push(request.url().to_string());
                }
                Err(e) => {
                    tracing::error!(error = %e, "manifest fetch task did not complete");
                    failed.push(format!("<task: {e}>"));
                }
            }
        }
        (fetched, failed)
    }

    /// Install event: pre-populate the static store with the asset manifest.
    ///
    /// Under [`InstallPolicy::Atomic`] any failed asset aborts the install
    /// with nothing written and the worker becomes [`WorkerState::Redundant`].
    /// Running install again with an unchanged manifest leaves the store as it was.
    pub async fn install(&self) -> Result<InstallReport, Error> {
        let state = self.state().await;
        if matches!(state, WorkerState::Superseded | WorkerState::Redundant) {
            return Err(Error::InvalidInput(format!("cannot install a {state:?} worker")));
        }

        let result = self.precache().await;

        match (&result, state) {
            (Ok(_), WorkerState::Installing) => self.set_state(WorkerState::Waiting).await,
            (Err(e), WorkerState::Installing) => {
                tracing::error!(version = %self.settings.version, error = %e, "install failed");
                self.set_state(WorkerState::Redundant).await;
            }
            _ => {}
        }

        result
    }

    async fn precache(&self) -> Result<InstallReport, Error> {
        let store = self.settings.stores.static_name.clone();
        self.ctx
            .caches
            .open(&store)
            .await
            .map_err(|e| Error::StoreUnavailable(format!("{store}: {e}")))?;

        tracing::info!(store, assets = self.settings.manifest.len(), "caching static assets");
        let (fetched, failed) = self.fetch_manifest().await;

        if !failed.is_empty() && self.settings.install_policy == InstallPolicy::Atomic {
            return Err(Error::ManifestFetchFailure {
                failed: failed.len(),
                total: self.settings.manifest.len(),
                first: failed[0].clone(),
            });
        }

        self.ctx
            .caches
            .put_all(&store, &fetched)
            .await
            .map_err(|e| Error::StoreUnavailable(format!("{store}: {e}")))?;

        Ok(InstallReport { store, cached: fetched.len(), failed, skip_waiting: self.settings.skip_waiting })
    }

    /// Activate event: delete every store not belonging to this version, then claim clients.
    ///
    /// Only an installed (waiting) or already active worker may activate.
    pub async fn activate(&self) -> Result<ActivateReport, Error> {
        let state = self.state().await;
        if !matches!(state, WorkerState::Waiting | WorkerState::Active) {
            return Err(Error::InvalidInput(format!("cannot activate a {state:?} worker")));
        }

        let names = self
            .ctx
            .caches
            .store_names()
            .await
            .map_err(|e| Error::StoreUnavailable(format!("listing stores: {e}")))?;

        let mut deleted = Vec::new();
        let mut failed = Vec::new();
        for name in names.into_iter().filter(|n| !self.settings.stores.is_current(n)) {
            tracing::info!(store = %name, "deleting old cache");
            match self.ctx.caches.delete_store(&name).await {
                Ok(_) => deleted.push(name),
                Err(e) => {
                    tracing::warn!(store = %name, error = %e, "failed to delete old cache");
                    failed.push(name);
                }
            }
        }

        let claimed = match self.clients.claim(&self.settings.version).await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!(error = %e, "failed to claim clients");
                0
            }
        };

        self.set_state(WorkerState::Active).await;
        tracing::info!(version = %self.settings.version, claimed, "worker activated");

        Ok(ActivateReport { deleted, failed, claimed })
    }

    /// Mark this version as replaced by a newer active one.
    pub async fn supersede(&self) {
        self.set_state(WorkerState::Superseded).await;
    }
}
