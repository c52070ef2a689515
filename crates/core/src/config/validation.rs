//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `cache_version` is empty
    /// - a store prefix is empty, or both prefixes are equal
    /// - `origin` is not an http(s) URL
    /// - a manifest entry does not resolve to an http(s) URL
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.version()?;

        if self.static_prefix.trim().is_empty() {
            return Err(invalid("static_prefix", "must not be empty"));
        }
        if self.dynamic_prefix.trim().is_empty() {
            return Err(invalid("dynamic_prefix", "must not be empty"));
        }
        if self.static_prefix == self.dynamic_prefix {
            return Err(invalid("dynamic_prefix", "must differ from static_prefix"));
        }

        let origin = self.origin_url()?;
        if !crate::uri::is_http(&origin) {
            return Err(invalid("origin", format!("unsupported scheme: {}", origin.scheme())));
        }

        let manifest = self.asset_manifest()?;
        if manifest.len() < self.manifest.len() {
            tracing::warn!(
                configured = self.manifest.len(),
                unique = manifest.len(),
                "manifest contains duplicate entries; later duplicates are ignored"
            );
        }

        if self.max_bytes == 0 {
            return Err(invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(invalid("max_bytes", "must not exceed 50MB"));
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        Ok(())
    }
}
