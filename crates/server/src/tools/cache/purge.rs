//! cache_purge tool implementation.
//!
//! Deletes named stores, or every store outside the active generation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use stalecache_core::{CacheDb, Error, StoreNames};

use crate::tools::json_result;

/// Parameters for the cache_purge tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeParams {
    /// Delete these stores by name.
    #[serde(default)]
    pub stores: Vec<String>,

    /// Delete every store that does not belong to the active version.
    #[serde(default)]
    pub stale: bool,
}

/// Output from the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeOutput {
    /// Names of the stores that were deleted.
    pub deleted: Vec<String>,
}

/// Implementation of the cache_purge tool.
///
/// `current` names the active generation; `stale` is rejected without one.
pub async fn purge_impl(
    cache: &CacheDb, current: Option<&StoreNames>, params: CachePurgeParams,
) -> Result<CallToolResult, McpError> {
    if params.stores.is_empty() && !params.stale {
        return Err(Error::InvalidInput("At least one of stores or stale must be specified".to_string()).into());
    }

    let mut targets = params.stores;
    if params.stale {
        let current = current.ok_or_else(|| Error::InvalidInput("no active version to compare against".into()))?;
        targets.extend(cache.store_names().await?.into_iter().filter(|n| !current.is_current(n)));
    }
    targets.sort();
    targets.dedup();

    let mut deleted = Vec::new();
    for name in targets {
        if cache.delete_store(&name).await? {
            tracing::info!(store = %name, "purged store");
            deleted.push(name);
        }
    }

    Ok(json_result(&CachePurgeOutput { deleted })?)
}
