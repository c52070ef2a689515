//! Network boundary.

use async_trait::async_trait;

use crate::{Error, Request, Response};

/// A single `fetch(request) -> response | failure` primitive.
///
/// Implementations return `Ok` for every response the server produced,
/// including 4xx/5xx. Only transport failures (connection refused, reset,
/// timeout, oversized body) are `Err`.
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response, Error>;
}
