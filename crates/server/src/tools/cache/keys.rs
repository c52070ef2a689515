//! cache_keys tool implementation.
//!
//! Lists the requests stored in one named store.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use stalecache_core::{CacheDb, Error};

use crate::tools::json_result;

/// Parameters for the cache_keys tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheKeysParams {
    /// Store name, e.g. "static-v1.0.7".
    pub store: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheKey {
    pub method: String,
    pub url: String,
}

/// Output from the cache_keys tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheKeysOutput {
    pub store: String,
    pub keys: Vec<CacheKey>,
}

/// Implementation of the cache_keys tool.
pub async fn keys_impl(cache: &CacheDb, params: CacheKeysParams) -> Result<CallToolResult, McpError> {
    if !cache.store_names().await?.contains(&params.store) {
        return Err(Error::CacheMiss(format!("no store named {}", params.store)).into());
    }

    let keys = cache
        .entry_keys(&params.store)
        .await?
        .into_iter()
        .map(|r| CacheKey { method: r.method().to_string(), url: r.url().to_string() })
        .collect();

    Ok(json_result(&CacheKeysOutput { store: params.store, keys })?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::parse_result;
    use stalecache_core::{Request, Response};

    #[tokio::test]
    async fn test_keys_missing_store() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let params = CacheKeysParams { store: "static-v9".to_string() };

        let err = keys_impl(&cache, params).await.unwrap_err();
        assert_eq!(err.code.0, -32001);
    }

    #[tokio::test]
    async fn test_keys_found() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let request = Request::parse("GET", "https://example.com/style.css", None).unwrap();
        cache.put_entry("static-v1", &request, &Response::new(200, "body{}")).await.unwrap();

        let params = CacheKeysParams { store: "static-v1".to_string() };
        let output: CacheKeysOutput = parse_result(&keys_impl(&cache, params).await.unwrap());

        assert_eq!(output.keys.len(), 1);
        assert_eq!(output.keys[0].method, "GET");
        assert_eq!(output.keys[0].url, "https://example.com/style.css");
    }
}
