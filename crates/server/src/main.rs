//! mcp-offline server entry point.
//!
//! This is the main binary that boots the offline caching worker and serves it
//! as an MCP server on stdio transport. Logging goes to stderr to avoid
//! interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use stalecache_client::{FetchClient, FetchConfig};
use stalecache_core::{AppConfig, CacheDb};

mod error;
mod handler;
mod host;
mod logging;
mod state;
mod tools;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    logging::init();

    let config = AppConfig::load().context("loading configuration")?;
    tracing::info!(version = %config.cache_version, db = %config.db_path.display(), "Starting mcp-offline server on stdio transport");

    let caches = Arc::new(CacheDb::open(&config.db_path).await.context("opening cache database")?);
    let network = Arc::new(FetchClient::new(FetchConfig::from(&config)).context("building HTTP client")?);
    let state = Arc::new(state::AppState::new(config, caches, network));

    match state.boot().await {
        Ok(report) => tracing::info!(version = %report.version, cached = report.install.cached, "worker ready"),
        Err(e) => tracing::error!(error = %e, "initial install failed; requests pass through until sw_update succeeds"),
    }

    let handler = handler::McpOfflineServer::new(state);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
