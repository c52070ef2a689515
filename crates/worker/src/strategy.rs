//! The three fetch strategies.
//!
//! Every strategy answers with a response: transport failures are caught
//! here and turned into a cache fallback or a synthetic 503, never returned
//! to the router. Only 2xx responses are ever written to a store.

use std::sync::Arc;

use serde::Serialize;
use stalecache_core::{CacheStorage, Error, Network, Request, Response, Strategy};

use crate::event::WaitUntil;

/// Body of the synthetic 503 from cache-first and stale-while-revalidate.
pub const RESOURCE_UNAVAILABLE: &str = "Resource not available";

/// Body of the synthetic 503 from network-first.
pub const OFFLINE_UNAVAILABLE: &str = "Offline content not available";

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseSource {
    Cache,
    Network,
    Synthetic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Served {
    pub response: Response,
    pub source: ResponseSource,
}

impl Served {
    fn cache(response: Response) -> Self {
        Self { response, source: ResponseSource::Cache }
    }

    fn network(response: Response) -> Self {
        Self { response, source: ResponseSource::Network }
    }

    fn unavailable(message: &'static str) -> Self {
        Self { response: Response::unavailable(message), source: ResponseSource::Synthetic }
    }
}

/// Storage and network handles shared by every strategy invocation.
#[derive(Clone)]
pub struct StrategyContext {
    pub caches: Arc<dyn CacheStorage>,
    pub network: Arc<dyn Network>,
}

impl StrategyContext {
    pub fn new(caches: Arc<dyn CacheStorage>, network: Arc<dyn Network>) -> Self {
        Self { caches, network }
    }

    /// Store lookup where a storage failure counts as a miss.
    async fn lookup(&self, store: &str, request: &Request) -> Option<Response> {
        match self.caches.get(store, request).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(store, url = %request.url(), error = %e, "cache lookup failed; treating as miss");
                None
            }
        }
    }

    /// Write a copy of `response` if it is 2xx. Returns whether it was stored.
    pub(crate) async fn store_if_ok(&self, store: &str, request: &Request, response: &Response) -> bool {
        if !response.is_ok() {
            tracing::debug!(store, url = %request.url(), status = response.status, "not caching unsuccessful response");
            return false;
        }
        match self.caches.put(store, request, response).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(store, url = %request.url(), error = %e, "failed to write cache entry");
                false
            }
        }
    }

    /// Fetch from the network and store a copy on success.
    async fn fetch_and_store(&self, store: &str, request: &Request) -> Result<Response, Error> {
        let response = self.network.fetch(request).await?;
        self.store_if_ok(store, request, &response).await;
        Ok(response)
    }

    /// Background refresh of an entry that was just served from `store`.
    ///
    /// The store may be deleted by a newer version's activation while the
    /// fetch is in flight; the fresh copy is then dropped instead of
    /// recreating the store.
    async fn revalidate(&self, store: &str, request: &Request) -> Result<(), Error> {
        let response = self.network.fetch(request).await?;
        if !response.is_ok() {
            tracing::debug!(store, url = %request.url(), status = response.status, "keeping stale copy");
            return Ok(());
        }
        match self.caches.replace(store, request, &response).await {
            Ok(true) => {}
            Ok(false) => tracing::debug!(store, url = %request.url(), "store deleted during revalidation"),
            Err(e) => tracing::warn!(store, url = %request.url(), error = %e, "failed to write cache entry"),
        }
        Ok(())
    }
}

/// Serve from the store; only on a miss go to the network.
pub async fn cache_first(ctx: &StrategyContext, request: &Request, store: &str) -> Served {
    if let Some(cached) = ctx.lookup(store, request).await {
        tracing::debug!(store, url = %request.url(), "cache hit");
        return Served::cache(cached);
    }

    tracing::debug!(store, url = %request.url(), "cache miss");
    match ctx.fetch_and_store(store, request).await {
        Ok(response) => Served::network(response),
        Err(e) => {
            tracing::info!(url = %request.url(), error = %e, "cache-first strategy failed");
            Served::unavailable(RESOURCE_UNAVAILABLE)
        }
    }
}

/// Go to the network; fall back to the store only if the network is unreachable.
pub async fn network_first(ctx: &StrategyContext, request: &Request, store: &str) -> Served {
    let error = match ctx.fetch_and_store(store, request).await {
        Ok(response) => return Served::network(response),
        Err(e) => e,
    };

    tracing::info!(url = %request.url(), error = %error, "network-first strategy failed, trying cache");
    match ctx.lookup(store, request).await {
        Some(cached) => Served::cache(cached),
        None => Served::unavailable(OFFLINE_UNAVAILABLE),
    }
}

/// Answer from the store immediately when possible and refresh it in the background.
///
/// The refresh is tracked in `wait_until` when a cached copy was served; when
/// nothing was cached the caller has to wait for the network anyway.
pub async fn stale_while_revalidate(
    ctx: &StrategyContext, request: &Request, store: &str, wait_until: &mut WaitUntil,
) -> Served {
    let cached = ctx.lookup(store, request).await;

    let Some(cached) = cached else {
        return match ctx.fetch_and_store(store, request).await {
            Ok(response) => Served::network(response),
            Err(e) => {
                tracing::info!(url = %request.url(), error = %e, "revalidation failed with nothing cached");
                Served::unavailable(RESOURCE_UNAVAILABLE)
            }
        };
    };

    let refresh_ctx = ctx.clone();
    let refresh_store = store.to_string();
    let refresh_request = request.clone();
    let handle = tokio::spawn(async move {
        refresh_ctx.revalidate(&refresh_store, &refresh_request).await
    });
    wait_until.track(format!("revalidate {}", request.url()), handle);

    tracing::debug!(store, url = %request.url(), "serving stale copy while revalidating");
    Served::cache(cached)
}

/// Dispatch on the strategy tag.
pub async fn run(
    strategy: Strategy, ctx: &StrategyContext, request: &Request, store: &str, wait_until: &mut WaitUntil,
) -> Served {
    match strategy {
        Strategy::CacheFirst => cache_first(ctx, request, store).await,
        Strategy::NetworkFirst => network_first(ctx, request, store).await,
        Strategy::StaleWhileRevalidate => stale_while_revalidate(ctx, request, store, wait_until).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubNetwork;
    use stalecache_core::CacheDb;

    const STORE: &str = "static-v1";

    async fn setup() -> (StrategyContext, Arc<StubNetwork>, Arc<CacheDb>) {
        let db = Arc::new(CacheDb::open_in_memory().await.unwrap());
        let network = Arc::new(StubNetwork::new());
        let ctx = StrategyContext::new(db.clone(), network.clone());
        (ctx, network, db)
    }

    fn get(url: &str) -> Request {
        Request::parse("GET", url, None).unwrap()
    }

    #[tokio::test]
    async fn test_cache_first_hit_skips_network() {
        let (ctx, network, db) = setup().await;
        let request = get("https://example.com/style.css");
        db.put_entry(STORE, &request, &Response::new(200, "cached")).await.unwrap();
        network.respond("https://example.com/style.css", Response::new(200, "fresh"));

        let served = cache_first(&ctx, &request, STORE).await;

        assert_eq!(served.source, ResponseSource::Cache);
        assert_eq!(served.response.text(), "cached");
        assert_eq!(network.calls(), 0);
    }

    #[tokio::test]
    async fn test_cache_first_miss_fetches_and_stores() {
        let (ctx, network, db) = setup().await;
        let request = get("https://example.com/style.css");
        network.respond("https://example.com/style.css", Response::new(200, "fresh"));

        let served = cache_first(&ctx, &request, STORE).await;

        assert_eq!(served.source, ResponseSource::Network);
        assert_eq!(served.response.text(), "fresh");
        assert_eq!(db.get_entry(STORE, &request).await.unwrap().unwrap().text(), "fresh");

        // Second call is served from the store.
        let again = cache_first(&ctx, &request, STORE).await;
        assert_eq!(again.source, ResponseSource::Cache);
        assert_eq!(network.calls(), 1);
        assert_eq!(network.seen(), vec!["GET https://example.com/style.css"]);
    }

    #[tokio::test]
    async fn test_cache_first_does_not_store_errors() {
        let (ctx, network, db) = setup().await;
        let request = get("https://example.com/missing.js");
        network.respond("https://example.com/missing.js", Response::new(404, "not found"));

        let served = cache_first(&ctx, &request, STORE).await;

        assert_eq!(served.response.status, 404);
        assert!(db.get_entry(STORE, &request).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_network_first_prefers_network_and_overwrites() {
        let (ctx, network, db) = setup().await;
        let request = get("https://example.com/api/status");
        db.put_entry(STORE, &request, &Response::new(200, "stale")).await.unwrap();
        network.respond("https://example.com/api/status", Response::new(200, "fresh"));

        let served = network_first(&ctx, &request, STORE).await;

        assert_eq!(served.source, ResponseSource::Network);
        assert_eq!(served.response.text(), "fresh");
        assert_eq!(db.get_entry(STORE, &request).await.unwrap().unwrap().text(), "fresh");
    }

    #[tokio::test]
    async fn test_network_first_falls_back_to_cache() {
        let (ctx, network, db) = setup().await;
        let request = get("https://example.com/api/status");
        db.put_entry(STORE, &request, &Response::new(200, "stale")).await.unwrap();
        network.fail("https://example.com/api/status");

        let served = network_first(&ctx, &request, STORE).await;

        assert_eq!(served.source, ResponseSource::Cache);
        assert_eq!(served.response.text(), "stale");
    }

    #[tokio::test]
    async fn test_network_first_http_error_is_not_a_failure() {
        let (ctx, network, db) = setup().await;
        let request = get("https://example.com/api/status");
        db.put_entry(STORE, &request, &Response::new(200, "stale")).await.unwrap();
        network.respond("https://example.com/api/status", Response::new(500, "server error"));

        let served = network_first(&ctx, &request, STORE).await;

        assert_eq!(served.source, ResponseSource::Network);
        assert_eq!(served.response.status, 500);
        assert_eq!(db.get_entry(STORE, &request).await.unwrap().unwrap().text(), "stale");
    }

    #[tokio::test]
    async fn test_swr_returns_stale_then_refreshes() {
        let (ctx, network, db) = setup().await;
        let request = get("https://example.com/index.html");
        db.put_entry(STORE, &request, &Response::new(200, "E")).await.unwrap();
        network.respond("https://example.com/index.html", Response::new(200, "E'"));

        let mut wait = WaitUntil::new();
        let served = stale_while_revalidate(&ctx, &request, STORE, &mut wait).await;

        assert_eq!(served.source, ResponseSource::Cache);
        assert_eq!(served.response.text(), "E");
        assert_eq!(wait.len(), 1);

        let report = wait.settle().await;
        assert_eq!(report.completed, 1);

        let after = cache_first(&ctx, &request, STORE).await;
        assert_eq!(after.response.text(), "E'");
    }

    #[tokio::test]
    async fn test_swr_refresh_failure_is_observed() {
        let (ctx, network, db) = setup().await;
        let request = get("https://example.com/index.html");
        db.put_entry(STORE, &request, &Response::new(200, "E")).await.unwrap();
        network.fail("https://example.com/index.html");

        let mut wait = WaitUntil::new();
        let served = stale_while_revalidate(&ctx, &request, STORE, &mut wait).await;
        assert_eq!(served.response.text(), "E");

        let report = wait.settle().await;
        assert_eq!(report.failed, 1);
        assert_eq!(db.get_entry(STORE, &request).await.unwrap().unwrap().text(), "E");
    }

    #[tokio::test]
    async fn test_swr_refresh_keeps_stale_on_error_status() {
        let (ctx, network, db) = setup().await;
        let request = get("https://example.com/index.html");
        db.put_entry(STORE, &request, &Response::new(200, "E")).await.unwrap();
        network.respond("https://example.com/index.html", Response::new(404, "not found"));

        let mut wait = WaitUntil::new();
        let served = stale_while_revalidate(&ctx, &request, STORE, &mut wait).await;
        assert_eq!(served.response.text(), "E");

        let report = wait.settle().await;
        assert_eq!(report.completed, 1);
        let stored = db.get_entry(STORE, &request).await.unwrap().unwrap();
        assert_eq!(stored.status, 200);
        assert_eq!(stored.text(), "E");
    }

    #[tokio::test]
    async fn test_swr_refresh_does_not_recreate_deleted_store() {
        let (ctx, network, db) = setup().await;
        let request = get("https://example.com/index.html");
        db.put_entry(STORE, &request, &Response::new(200, "E")).await.unwrap();
        network.respond("https://example.com/index.html", Response::new(200, "E'"));

        let mut wait = WaitUntil::new();
        let served = stale_while_revalidate(&ctx, &request, STORE, &mut wait).await;
        assert_eq!(served.response.text(), "E");
        db.delete_store(STORE).await.unwrap();

        let report = wait.settle().await;

        assert_eq!(report.completed, 1);
        assert!(db.store_names().await.unwrap().is_empty());
        assert!(db.get_entry(STORE, &request).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_swr_miss_waits_for_network() {
        let (ctx, network, db) = setup().await;
        let request = get("https://example.com/index.html");
        network.respond("https://example.com/index.html", Response::new(200, "fresh"));

        let mut wait = WaitUntil::new();
        let served = stale_while_revalidate(&ctx, &request, STORE, &mut wait).await;

        assert_eq!(served.source, ResponseSource::Network);
        assert_eq!(served.response.text(), "fresh");
        assert!(wait.is_empty());
        assert!(db.get_entry(STORE, &request).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_total_failure_yields_503_for_every_strategy() {
        let (ctx, network, _db) = setup().await;
        let request = get("https://example.com/offline.html");
        network.fail("https://example.com/offline.html");

        for strategy in [Strategy::CacheFirst, Strategy::NetworkFirst, Strategy::StaleWhileRevalidate] {
            let mut wait = WaitUntil::new();
            let served = run(strategy, &ctx, &request, STORE, &mut wait).await;
            assert_eq!(served.response.status, 503, "{strategy}");
            assert!(!served.response.body.is_empty(), "{strategy}");
            assert_eq!(served.source, ResponseSource::Synthetic);
        }
    }

    #[tokio::test]
    async fn test_unavailable_bodies() {
        let (ctx, _network, _db) = setup().await;
        let request = get("https://example.com/unknown");

        assert_eq!(cache_first(&ctx, &request, STORE).await.response.text(), RESOURCE_UNAVAILABLE);
        assert_eq!(network_first(&ctx, &request, STORE).await.response.text(), OFFLINE_UNAVAILABLE);
    }
}
