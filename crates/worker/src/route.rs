//! Request routing: pick exactly one strategy and store role per request.
//!
//! Rules are evaluated in order and the first match wins:
//!
//! 1. non-GET → passthrough
//! 2. non-HTTP(S) → passthrough
//! 3. `/` or HTML page → page strategy, static store
//! 4. stylesheet / script → cache-first, static store
//! 5. `/assets/` or icon/image → cache-first, static store
//! 6. third-party font/CDN host → cache-first, static store
//! 7. anything else → network-first, fallback store
//!
//! The router performs no I/O.

use serde::Serialize;
use stalecache_core::{AppConfig, Request, StoreRole, Strategy, uri};

const PAGE_EXTENSIONS: &[&str] = &[".html", ".htm"];
const CODE_EXTENSIONS: &[&str] = &[".css", ".js", ".mjs"];
const IMAGE_EXTENSIONS: &[&str] = &[".ico", ".png", ".svg", ".jpg", ".jpeg", ".gif", ".webp", ".avif"];
const ASSETS_SEGMENT: &str = "/assets/";

/// Where a request goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, schemars::JsonSchema)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Route {
    /// Not intercepted; the host performs the request unmodified.
    Passthrough,
    Handle { strategy: Strategy, role: StoreRole },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Router {
    page_strategy: Strategy,
    fallback_role: StoreRole,
    third_party_hosts: Vec<String>,
}

impl Default for Router {
    fn default() -> Self {
        Self {
            page_strategy: Strategy::StaleWhileRevalidate,
            fallback_role: StoreRole::Dynamic,
            third_party_hosts: vec!["use.fontawesome.com".into()],
        }
    }
}

fn ends_with_any(path: &str, extensions: &[&str]) -> bool {
    extensions.iter().any(|ext| path.ends_with(ext))
}

impl Router {
    pub fn new(page_strategy: Strategy, fallback_role: StoreRole, third_party_hosts: Vec<String>) -> Self {
        let third_party_hosts = third_party_hosts.into_iter().map(|h| h.to_lowercase()).collect();
        Self { page_strategy, fallback_role, third_party_hosts }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.page_strategy, config.fallback_role, config.third_party_hosts.clone())
    }

    pub fn route(&self, request: &Request) -> Route {
        if !request.is_get() || !uri::is_http(request.url()) {
            return Route::Passthrough;
        }

        let path = request.url().path().to_ascii_lowercase();
        let handle = |strategy| Route::Handle { strategy, role: StoreRole::Static };

        if path == "/" || ends_with_any(&path, PAGE_EXTENSIONS) {
            return handle(self.page_strategy);
        }
        if ends_with_any(&path, CODE_EXTENSIONS) {
            return handle(Strategy::CacheFirst);
        }
        if path.contains(ASSETS_SEGMENT) || ends_with_any(&path, IMAGE_EXTENSIONS) {
            return handle(Strategy::CacheFirst);
        }
        if let Some(host) = request.url().host_str()
            && self.third_party_hosts.iter().any(|h| h == host)
        {
            return handle(Strategy::CacheFirst);
        }

        Route::Handle { strategy: Strategy::NetworkFirst, role: self.fallback_role }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(url: &str) -> Request {
        Request::parse("GET", url, None).unwrap()
    }

    fn static_route(strategy: Strategy) -> Route {
        Route::Handle { strategy, role: StoreRole::Static }
    }

    #[test]
    fn test_non_get_bypasses() {
        let router = Router::default();
        for method in ["POST", "PUT", "DELETE", "HEAD"] {
            let request = Request::parse(method, "https://example.com/style.css", None).unwrap();
            assert_eq!(router.route(&request), Route::Passthrough, "{method}");
        }
    }

    #[test]
    fn test_non_http_bypasses() {
        let router = Router::default();
        assert_eq!(router.route(&get("chrome-extension://abc/script.js")), Route::Passthrough);
        assert_eq!(router.route(&get("data:text/css,body{}")), Route::Passthrough);
    }

    #[test]
    fn test_pages_use_page_strategy() {
        let router = Router::default();
        assert_eq!(router.route(&get("https://example.com/")), static_route(Strategy::StaleWhileRevalidate));
        assert_eq!(
            router.route(&get("https://example.com/links.html")),
            static_route(Strategy::StaleWhileRevalidate)
        );
        assert_eq!(
            router.route(&get("https://example.com/PROFILES.HTML?ref=nav")),
            static_route(Strategy::StaleWhileRevalidate)
        );

        let router = Router::new(Strategy::NetworkFirst, StoreRole::Dynamic, Vec::new());
        assert_eq!(router.route(&get("https://example.com/index.html")), static_route(Strategy::NetworkFirst));
    }

    #[test]
    fn test_code_is_cache_first() {
        let router = Router::default();
        assert_eq!(router.route(&get("https://example.com/style.css?v=assets1")), static_route(Strategy::CacheFirst));
        assert_eq!(router.route(&get("https://example.com/app.mjs")), static_route(Strategy::CacheFirst));
    }

    #[test]
    fn test_assets_and_images_are_cache_first() {
        let router = Router::default();
        assert_eq!(router.route(&get("https://example.com/assets/data.json")), static_route(Strategy::CacheFirst));
        assert_eq!(router.route(&get("https://example.com/favicon.ico")), static_route(Strategy::CacheFirst));
        assert_eq!(router.route(&get("https://example.com/img/banner.PNG")), static_route(Strategy::CacheFirst));
    }

    #[test]
    fn test_third_party_host_is_cache_first() {
        let router = Router::default();
        assert_eq!(
            router.route(&get("https://use.fontawesome.com/releases/v6.4.2/webfonts/fa-brands-400.woff2")),
            static_route(Strategy::CacheFirst)
        );

        let router = Router::new(Strategy::StaleWhileRevalidate, StoreRole::Dynamic, vec!["Fonts.GStatic.com".into()]);
        assert_eq!(
            router.route(&get("https://fonts.gstatic.com/s/inter/v12/font.woff2")),
            static_route(Strategy::CacheFirst)
        );
    }

    #[test]
    fn test_fallback_route() {
        let router = Router::default();
        assert_eq!(
            router.route(&get("https://example.com/api/status")),
            Route::Handle { strategy: Strategy::NetworkFirst, role: StoreRole::Dynamic }
        );

        let router = Router::new(Strategy::StaleWhileRevalidate, StoreRole::Static, Vec::new());
        assert_eq!(router.route(&get("https://example.com/feed.xml")), static_route(Strategy::NetworkFirst));
    }

    #[test]
    fn test_first_match_wins() {
        // An HTML page under /assets/ is still a page.
        let router = Router::default();
        assert_eq!(
            router.route(&get("https://example.com/assets/embed.html")),
            static_route(Strategy::StaleWhileRevalidate)
        );
    }
}
