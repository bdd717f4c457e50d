//! cache_list tool implementation.
//!
//! Lists the request keys stored in the worker's named cache.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_worker::Worker;

use crate::tools::json_result;

/// Parameters for the cache_list tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheListParams {
    /// Only include URLs starting with this prefix.
    #[serde(default)]
    pub prefix: Option<String>,

    /// Maximum number of entries to return (default: 100).
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    100
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheEntry {
    pub method: String,
    pub url: String,
}

/// Output from the cache_list tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheListOutput {
    pub cache_name: String,
    /// Matching entries before the limit is applied.
    pub total: usize,
    pub entries: Vec<CacheEntry>,
}

/// Implementation of the cache_list tool.
pub async fn list_impl(worker: &Worker, params: CacheListParams) -> Result<CallToolResult, McpError> {
    let CacheListParams { prefix, limit } = params;
    let keys = worker.cached_keys().await?;

    let matching: Vec<CacheEntry> = keys
        .into_iter()
        .filter(|key| prefix.as_deref().is_none_or(|p| key.url.starts_with(p)))
        .map(|key| CacheEntry { method: key.method, url: key.url })
        .collect();

    let total = matching.len();
    let entries = matching.into_iter().take(limit).collect();

    json_result(&CacheListOutput { cache_name: worker.policy().cache_name.clone(), total, entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{parse, worker};
    use swcache_core::{Cache, Request, Response};

    #[tokio::test]
    async fn test_list_empty() {
        let (worker, _, _) = worker();
        let params = CacheListParams { prefix: None, limit: default_limit() };

        let output: CacheListOutput = parse(&list_impl(&worker, params).await.unwrap());

        assert_eq!(output.total, 0);
        assert!(output.entries.is_empty());
        assert_eq!(output.cache_name, "swcache-dynamic-cache-v3");
    }

    #[tokio::test]
    async fn test_list_prefix_and_limit() {
        let (worker, _, storage) = worker();
        let cache = storage.cache("swcache-dynamic-cache-v3").await;
        for raw in ["https://example.com/a.png", "https://example.com/b.png", "https://cdn.example.net/c.js"] {
            let key = Request::parse_get(raw).unwrap().key();
            cache.put(&key, &Response::new(raw, 200, "x")).await.unwrap();
        }

        let params = CacheListParams { prefix: Some("https://example.com/".into()), limit: 1 };
        let output: CacheListOutput = parse(&list_impl(&worker, params).await.unwrap());

        assert_eq!(output.total, 2);
        assert_eq!(output.entries.len(), 1);
        assert_eq!(output.entries[0].url, "https://example.com/a.png");
        assert_eq!(output.entries[0].method, "GET");
    }
}
