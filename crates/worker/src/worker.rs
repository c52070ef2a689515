//! One versioned worker instance and its fetch handler.

use std::sync::Arc;

use stalecache_core::{
    AppConfig, AssetManifest, CacheStorage, CacheVersion, ConfigError, InstallPolicy, Network, Request, StoreNames,
};
use tokio::sync::RwLock;
use url::Url;

use crate::event::WaitUntil;
use crate::host::{Clients, Notifier};
use crate::lifecycle::WorkerState;
use crate::route::{Route, Router};
use crate::strategy::{self, Served, StrategyContext};

/// Everything a worker version is built from, fixed at deploy time.
#[derive(Debug, Clone)]
pub struct WorkerSettings {
    pub version: CacheVersion,
    pub stores: StoreNames,
    pub manifest: AssetManifest,
    pub router: Router,
    pub install_policy: InstallPolicy,
    pub skip_waiting: bool,
    pub origin: Url,
    pub site_name: String,
}

impl WorkerSettings {
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            version: config.version()?,
            stores: config.store_names()?,
            manifest: config.asset_manifest()?,
            router: Router::from_config(config),
            install_policy: config.install_policy,
            skip_waiting: config.skip_waiting,
            origin: config.origin_url()?,
            site_name: config.site_name.clone(),
        })
    }
}

/// Result of dispatching one fetch event.
#[derive(Debug)]
pub struct FetchOutcome {
    pub route: Route,
    /// `None` when the request was not intercepted.
    pub served: Option<Served>,
    /// Work still running after the response was chosen.
    pub wait_until: WaitUntil,
}

impl FetchOutcome {
    pub fn passthrough() -> Self {
        Self { route: Route::Passthrough, served: None, wait_until: WaitUntil::new() }
    }
}

pub struct Worker {
    pub(crate) settings: WorkerSettings,
    pub(crate) ctx: StrategyContext,
    pub(crate) clients: Arc<dyn Clients>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) state: RwLock<WorkerState>,
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("version", &self.settings.version)
            .field("stores", &self.settings.stores)
            .finish_non_exhaustive()
    }
}

impl Worker {
    pub fn new(
        settings: WorkerSettings, caches: Arc<dyn CacheStorage>, network: Arc<dyn Network>, clients: Arc<dyn Clients>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            settings,
            ctx: StrategyContext::new(caches, network),
            clients,
            notifier,
            state: RwLock::new(WorkerState::Installing),
        }
    }

    pub fn version(&self) -> &CacheVersion {
        &self.settings.version
    }

    pub fn settings(&self) -> &WorkerSettings {
        &self.settings
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    /// Handle a fetch event.
    ///
    /// Always yields a response for intercepted requests; see
    /// [`FetchOutcome::wait_until`] for work the host must still await.
    pub async fn handle_fetch(&self, request: &Request) -> FetchOutcome {
        let route = self.settings.router.route(request);
        let Route::Handle { strategy, role } = route else {
            tracing::debug!(method = request.method(), url = %request.url(), "passthrough");
            return FetchOutcome::passthrough();
        };

        let store = self.settings.stores.for_role(role);
        tracing::debug!(url = %request.url(), %strategy, store, "routing fetch");

        let mut wait_until = WaitUntil::new();
        let served = strategy::run(strategy, &self.ctx, request, store, &mut wait_until).await;

        FetchOutcome { route, served: Some(served), wait_until }
    }
}
