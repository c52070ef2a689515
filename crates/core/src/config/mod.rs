//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (STALECACHE_*)
//! 2. TOML config file (if STALECACHE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{AssetManifest, CacheVersion, StoreNames, StoreRole, Strategy};

mod validation;

pub use validation::ConfigError;

/// What install does when a manifest asset cannot be fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum InstallPolicy {
    /// Any failure aborts install; nothing is written and the version never activates.
    #[default]
    Atomic,
    /// Failures are logged; whatever was fetched is written and install proceeds.
    BestEffort,
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (STALECACHE_*)
/// 2. TOML config file (if STALECACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to SQLite cache database.
    ///
    /// Set via STALECACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Current cache generation tag. Bump to invalidate every store.
    ///
    /// Set via STALECACHE_CACHE_VERSION environment variable.
    #[serde(default = "default_cache_version")]
    pub cache_version: String,

    /// Name prefix of the static (pre-cached) store.
    #[serde(default = "default_static_prefix")]
    pub static_prefix: String,

    /// Name prefix of the dynamic (runtime) store.
    #[serde(default = "default_dynamic_prefix")]
    pub dynamic_prefix: String,

    /// Site origin that root-relative manifest entries and requests resolve against.
    ///
    /// Set via STALECACHE_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Assets pre-cached on install, absolute or root-relative.
    #[serde(default = "default_manifest")]
    pub manifest: Vec<String>,

    /// Third-party font/CDN hosts served cache-first.
    #[serde(default = "default_third_party_hosts")]
    pub third_party_hosts: Vec<String>,

    /// Strategy for `/` and HTML pages.
    #[serde(default = "default_page_strategy")]
    pub page_strategy: Strategy,

    /// Store role for requests no other rule matches.
    #[serde(default = "default_fallback_role")]
    pub fallback_role: StoreRole,

    /// Manifest failure policy during install.
    #[serde(default)]
    pub install_policy: InstallPolicy,

    /// Activate a freshly installed version without waiting for old clients.
    #[serde(default = "default_true")]
    pub skip_waiting: bool,

    /// Default notification title for push messages without one.
    #[serde(default = "default_site_name")]
    pub site_name: String,

    /// User-Agent string for network fetches.
    ///
    /// Set via STALECACHE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Network request timeout in milliseconds.
    ///
    /// Set via STALECACHE_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum response body bytes accepted from the network.
    ///
    /// Set via STALECACHE_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./stalecache.sqlite")
}

fn default_cache_version() -> String {
    "v1.0.7".into()
}

fn default_static_prefix() -> String {
    "static".into()
}

fn default_dynamic_prefix() -> String {
    "dynamic".into()
}

fn default_origin() -> String {
    "http://localhost:8080".into()
}

fn default_manifest() -> Vec<String> {
    [
        "/",
        "/index.html",
        "/profiles.html",
        "/links.html",
        "/style.css",
        "/assets/js/common.js",
        "/assets/favicon.ico",
        "/assets/images/favicon.svg",
        "/assets/images/icon-192.png",
        "/assets/images/icon-512.png",
        "/assets/images/apple-touch-icon.png",
        "/assets/images/banner.png",
        "https://use.fontawesome.com/releases/v6.4.2/css/all.css",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_third_party_hosts() -> Vec<String> {
    vec!["use.fontawesome.com".into()]
}

fn default_page_strategy() -> Strategy {
    Strategy::StaleWhileRevalidate
}

fn default_fallback_role() -> StoreRole {
    StoreRole::Dynamic
}

fn default_true() -> bool {
    true
}

fn default_site_name() -> String {
    "stalecache".into()
}

fn default_user_agent() -> String {
    "stalecache/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            cache_version: default_cache_version(),
            static_prefix: default_static_prefix(),
            dynamic_prefix: default_dynamic_prefix(),
            origin: default_origin(),
            manifest: default_manifest(),
            third_party_hosts: default_third_party_hosts(),
            page_strategy: default_page_strategy(),
            fallback_role: default_fallback_role(),
            install_policy: InstallPolicy::default(),
            skip_waiting: true,
            site_name: default_site_name(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_bytes: default_max_bytes(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Parsed site origin.
    pub fn origin_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.origin)
            .map_err(|e| ConfigError::Invalid { field: "origin".into(), reason: e.to_string() })
    }

    pub fn version(&self) -> Result<CacheVersion, ConfigError> {
        CacheVersion::new(self.cache_version.as_str())
            .map_err(|e| ConfigError::Invalid { field: "cache_version".into(), reason: e.to_string() })
    }

    /// Live store names for the configured version.
    pub fn store_names(&self) -> Result<StoreNames, ConfigError> {
        Ok(StoreNames::new(&self.version()?, &self.static_prefix, &self.dynamic_prefix))
    }

    /// Manifest resolved against the origin.
    pub fn asset_manifest(&self) -> Result<AssetManifest, ConfigError> {
        AssetManifest::resolve(&self.origin_url()?, &self.manifest)
            .map_err(|e| ConfigError::Invalid { field: "manifest".into(), reason: e.to_string() })
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `STALECACHE_`
    /// 2. TOML file from `STALECACHE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("STALECACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("STALECACHE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.db_path, PathBuf::from("./stalecache.sqlite"));
        assert_eq!(config.cache_version, "v1.0.7");
        assert_eq!(config.page_strategy, Strategy::StaleWhileRevalidate);
        assert_eq!(config.fallback_role, StoreRole::Dynamic);
        assert_eq!(config.install_policy, InstallPolicy::Atomic);
        assert!(config.skip_waiting);
        assert_eq!(config.third_party_hosts, vec!["use.fontawesome.com"]);
        assert_eq!(config.timeout_ms, 20_000);
        assert_eq!(config.manifest.len(), 13);
        assert!(config.manifest.iter().any(|m| m == "/assets/images/banner.png"));
    }

    #[test]
    fn test_default_manifest_resolves() {
        let manifest = AppConfig::default().asset_manifest().unwrap();
        let urls: Vec<String> = manifest.requests().map(|r| r.url().to_string()).collect();
        assert_eq!(urls.len(), 13);
        assert_eq!(urls.last().map(String::as_str), Some("https://use.fontawesome.com/releases/v6.4.2/css/all.css"));
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
    }

    #[test]
    fn test_store_names_from_config() {
        let config = AppConfig { cache_version: "v2.0.0".into(), ..Default::default() };
        let names = config.store_names().unwrap();
        assert_eq!(names.static_name, "static-v2.0.0");
        assert_eq!(names.dynamic_name, "dynamic-v2.0.0");
    }

    #[test]
    fn test_asset_manifest_from_config() {
        let config = AppConfig {
            origin: "https://www.example.com".into(),
            manifest: vec!["/".into(), "/style.css".into()],
            ..Default::default()
        };
        let manifest = config.asset_manifest().unwrap();
        assert_eq!(manifest.urls()[1].as_str(), "https://www.example.com/style.css");
    }

    #[test]
    fn test_policy_serde_names() {
        let policy: InstallPolicy = serde_json::from_str("\"best-effort\"").unwrap();
        assert_eq!(policy, InstallPolicy::BestEffort);
        let strategy: Strategy = serde_json::from_str("\"network-first\"").unwrap();
        assert_eq!(strategy, Strategy::NetworkFirst);
    }

    #[test]
    fn test_load_from_toml_and_env() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "stalecache.toml",
                r#"
                cache_version = "v9"
                page_strategy = "network-first"
                manifest = ["/", "/index.html"]
                "#,
            )?;
            jail.set_env("STALECACHE_CONFIG_FILE", "stalecache.toml");
            jail.set_env("STALECACHE_FALLBACK_ROLE", "static");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.cache_version, "v9");
            assert_eq!(config.page_strategy, Strategy::NetworkFirst);
            assert_eq!(config.fallback_role, StoreRole::Static);
            assert_eq!(config.manifest.len(), 2);
            Ok(())
        });
    }
}
