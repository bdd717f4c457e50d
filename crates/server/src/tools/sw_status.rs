//! sw_status tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_worker::{ClientRegistry, Worker};

use crate::tools::json_result;

/// Output structure for sw_status tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwStatusOutput {
    pub version: String,
    pub cache_name: String,
    /// Lifecycle state: parsed, installed, activating or activated.
    pub state: String,
    /// Entries in the worker's cache.
    pub entries: usize,
    /// Registered clients.
    pub clients: usize,
    /// Clients controlled by this version.
    pub controlled: usize,
}

/// Implementation of the sw_status tool.
pub async fn status_impl(worker: &Worker, clients: &ClientRegistry) -> Result<CallToolResult, McpError> {
    let policy = worker.policy();
    let entries = worker.cached_keys().await?.len();

    json_result(&SwStatusOutput {
        version: policy.version.clone(),
        cache_name: policy.cache_name.clone(),
        state: worker.state().await.as_str().to_string(),
        entries,
        clients: clients.len().await,
        controlled: clients.controlled_by(&policy.version).await,
    })
}
