//! Request/response model and versioned store naming.

use std::borrow::Cow;
use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::Error;
use crate::cache::hash::compute_request_key;
use crate::uri;

/// Cache partition a route writes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum StoreRole {
    /// Build-time assets pre-cached on install.
    Static,
    /// Runtime-fetched, miscellaneous responses.
    Dynamic,
}

impl fmt::Display for StoreRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreRole::Static => f.write_str("static"),
            StoreRole::Dynamic => f.write_str("dynamic"),
        }
    }
}

/// The three fixed fetch strategies a route can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    CacheFirst,
    NetworkFirst,
    StaleWhileRevalidate,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::CacheFirst => f.write_str("cache-first"),
            Strategy::NetworkFirst => f.write_str("network-first"),
            Strategy::StaleWhileRevalidate => f.write_str("stale-while-revalidate"),
        }
    }
}

/// Opaque tag identifying one generation of cached content (e.g. `v1.0.7`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheVersion(String);

impl CacheVersion {
    pub fn new(tag: impl Into<String>) -> Result<Self, Error> {
        let tag = tag.into();
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidInput("cache version must not be empty".into()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Store name for a role prefix, e.g. `static` + `v1.0.7` -> `static-v1.0.7`.
    pub fn store_name(&self, prefix: &str) -> String {
        format!("{prefix}-{}", self.0)
    }
}

impl fmt::Display for CacheVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The pair of store names that are live for one cache version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreNames {
    pub static_name: String,
    pub dynamic_name: String,
}

impl StoreNames {
    pub fn new(version: &CacheVersion, static_prefix: &str, dynamic_prefix: &str) -> Self {
        Self { static_name: version.store_name(static_prefix), dynamic_name: version.store_name(dynamic_prefix) }
    }

    pub fn for_role(&self, role: StoreRole) -> &str {
        match role {
            StoreRole::Static => &self.static_name,
            StoreRole::Dynamic => &self.dynamic_name,
        }
    }

    /// Whether `name` belongs to this generation.
    pub fn is_current(&self, name: &str) -> bool {
        name == self.static_name || name == self.dynamic_name
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        [self.static_name.as_str(), self.dynamic_name.as_str()].into_iter()
    }
}

/// An intercepted request. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: String,
    url: Url,
    headers: Vec<(String, String)>,
}

impl Request {
    /// Build a request from an already-normalized URL.
    pub fn new(method: &str, url: Url) -> Self {
        Self { method: method.trim().to_ascii_uppercase(), url, headers: Vec::new() }
    }

    pub fn get(url: Url) -> Self {
        Self::new("GET", url)
    }

    /// Parse and normalize a request URL, resolving root-relative input against `base`.
    pub fn parse(method: &str, url: &str, base: Option<&Url>) -> Result<Self, Error> {
        if method.trim().is_empty() || !method.trim().bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(Error::InvalidInput(format!("invalid method: {method:?}")));
        }
        let url = uri::normalize(url, base).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        Ok(Self::new(method, url))
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    /// Identity of this request inside a store.
    pub fn key(&self) -> String {
        compute_request_key(&self.method, self.url.as_str())
    }
}

/// A response produced by the network, read from a store, or synthesized.
///
/// Cloning shares the body buffer, so a copy can be stored while the original
/// is handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self { status, headers: Vec::new(), body: body.into() }
    }

    /// Synthetic 503 returned when neither cache nor network can answer.
    pub fn unavailable(message: &'static str) -> Self {
        Self::new(503, Bytes::from_static(message.as_bytes())).with_header("content-type", "text/plain; charset=utf-8")
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// 2xx-class status.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header value matching `name`, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}
