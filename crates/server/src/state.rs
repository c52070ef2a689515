//! Shared server state: cache, network, host bridge and the worker registration.

use std::sync::Arc;

use stalecache_core::{AppConfig, CacheDb, Error, Network};
use stalecache_worker::{Registration, UpdateReport, Worker, WorkerSettings};

use crate::error::ServerError;
use crate::host::HostBridge;

pub struct AppState {
    pub config: AppConfig,
    pub caches: Arc<CacheDb>,
    pub network: Arc<dyn Network>,
    pub host: Arc<HostBridge>,
    pub registration: Registration,
}

impl AppState {
    pub fn new(config: AppConfig, caches: Arc<CacheDb>, network: Arc<dyn Network>) -> Self {
        Self { config, caches, network, host: Arc::new(HostBridge::new()), registration: Registration::new() }
    }

    /// Build a worker version from `config`, wired to this host.
    pub fn build_worker(&self, config: &AppConfig) -> Result<Arc<Worker>, Error> {
        config.validate().map_err(|e| Error::InvalidInput(e.to_string()))?;
        let settings = WorkerSettings::from_config(config).map_err(|e| Error::InvalidInput(e.to_string()))?;
        Ok(Arc::new(Worker::new(
            settings,
            self.caches.clone(),
            self.network.clone(),
            self.host.clone(),
            self.host.clone(),
        )))
    }

    /// Install and activate the configured version.
    pub async fn boot(&self) -> Result<UpdateReport, Error> {
        let worker = self.build_worker(&self.config)?;
        self.registration.update(worker).await
    }

    pub async fn active_worker(&self) -> Result<Arc<Worker>, ServerError> {
        self.registration
            .active()
            .await
            .ok_or_else(|| ServerError::NoActiveWorker("run sw_update to install a version".into()))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use stalecache_core::{Request, Response};

    use super::*;

    /// Serves a fixed set of URLs; everything else is unreachable.
    #[derive(Default)]
    pub struct FixedNetwork {
        pages: Mutex<HashMap<String, Response>>,
    }

    impl FixedNetwork {
        pub fn serve(&self, url: &str, body: &str) {
            self.pages.lock().unwrap().insert(url.to_string(), Response::new(200, body.to_string()));
        }

        pub fn go_offline(&self) {
            self.pages.lock().unwrap().clear();
        }
    }

    #[async_trait]
    impl Network for FixedNetwork {
        async fn fetch(&self, request: &Request) -> Result<Response, Error> {
            let url = request.url().to_string();
            self.pages
                .lock()
                .unwrap()
                .get(&url)
                .cloned()
                .ok_or_else(|| Error::Network(format!("unreachable: {url}")))
        }
    }

    pub fn config() -> AppConfig {
        AppConfig {
            origin: "https://www.example.com".into(),
            cache_version: "v1".into(),
            manifest: vec!["/".into(), "/style.css".into()],
            ..Default::default()
        }
    }

    /// State whose network serves the test manifest.
    pub async fn state() -> (AppState, Arc<FixedNetwork>) {
        let network = Arc::new(FixedNetwork::default());
        network.serve("https://www.example.com/", "home");
        network.serve("https://www.example.com/style.css", "body{}");
        let caches = Arc::new(CacheDb::open_in_memory().await.unwrap());
        (AppState::new(config(), caches, network.clone()), network)
    }
}
