//! Host-side holder of the waiting and active worker versions.

use std::sync::Arc;

use serde::Serialize;
use stalecache_core::{Error, Request};
use tokio::sync::RwLock;

use crate::lifecycle::{ActivateReport, InstallReport, WorkerState};
use crate::worker::{FetchOutcome, Worker};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, schemars::JsonSchema)]
pub struct UpdateReport {
    pub version: String,
    pub install: InstallReport,
    /// `None` when the new version was left waiting.
    pub activate: Option<ActivateReport>,
}

/// Snapshot of which versions occupy which slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, schemars::JsonSchema)]
pub struct RegistrationStatus {
    pub active: Option<String>,
    pub waiting: Option<String>,
}

#[derive(Debug, Default)]
pub struct Registration {
    active: RwLock<Option<Arc<Worker>>>,
    waiting: RwLock<Option<Arc<Worker>>>,
}

impl Registration {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn active(&self) -> Option<Arc<Worker>> {
        self.active.read().await.clone()
    }

    pub async fn waiting(&self) -> Option<Arc<Worker>> {
        self.waiting.read().await.clone()
    }

    pub async fn status(&self) -> RegistrationStatus {
        let version = |w: &Option<Arc<Worker>>| w.as_ref().map(|w| w.version().to_string());
        RegistrationStatus { active: version(&*self.active.read().await), waiting: version(&*self.waiting.read().await) }
    }

    /// Install `worker` and, if it skips waiting or nothing is active yet, activate it.
    ///
    /// A failed install leaves the registration untouched: the previous
    /// active version keeps serving.
    pub async fn update(&self, worker: Arc<Worker>) -> Result<UpdateReport, Error> {
        let version = worker.version().to_string();
        let install = worker.install().await?;

        let has_active = self.active.read().await.is_some();
        if install.skip_waiting || !has_active {
            let activate = self.promote(worker).await?;
            return Ok(UpdateReport { version, install, activate: Some(activate) });
        }

        tracing::info!(version, "new worker installed and waiting");
        if let Some(previous) = self.waiting.write().await.replace(worker) {
            previous.supersede().await;
        }
        Ok(UpdateReport { version, install, activate: None })
    }

    /// Activate the waiting version, if any.
    pub async fn activate_waiting(&self) -> Result<Option<ActivateReport>, Error> {
        let Some(worker) = self.waiting.write().await.take() else {
            return Ok(None);
        };
        self.promote(worker).await.map(Some)
    }

    async fn promote(&self, worker: Arc<Worker>) -> Result<ActivateReport, Error> {
        let report = worker.activate().await?;

        let previous = self.active.write().await.replace(Arc::clone(&worker));
        if let Some(previous) = previous
            && !Arc::ptr_eq(&previous, &worker)
        {
            previous.supersede().await;
        }

        // Whatever was waiting is older than the version just activated, and
        // its store is gone after the sweep.
        let stale = self.waiting.write().await.take();
        if let Some(stale) = stale
            && !Arc::ptr_eq(&stale, &worker)
        {
            tracing::info!(version = %stale.version(), "discarding waiting worker replaced by a newer activation");
            stale.supersede().await;
        }
        Ok(report)
    }

    /// Dispatch a fetch to the active worker. Without one nothing is intercepted.
    pub async fn fetch(&self, request: &Request) -> FetchOutcome {
        match self.active().await {
            Some(worker) if worker.state().await == WorkerState::Active => worker.handle_fetch(request).await,
            _ => FetchOutcome::passthrough(),
        }
    }
}
