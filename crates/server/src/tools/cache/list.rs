//! cache_list tool implementation.
//!
//! Lists every named store with its entry count.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use stalecache_core::{CacheDb, StoreSummary};

use crate::tools::json_result;

/// Output from the cache_list tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheListOutput {
    pub stores: Vec<StoreSummary>,
}

/// Implementation of the cache_list tool.
pub async fn list_impl(cache: &CacheDb) -> Result<CallToolResult, McpError> {
    let stores = cache.store_summaries().await?;
    Ok(json_result(&CacheListOutput { stores })?)
}
