//! MCP server handler implementation.
//!
//! This module defines the main server handler that routes tool calls to the
//! worker owned by this process.

use std::sync::Arc;

use crate::tools::cache::{CacheListParams, list_impl};
use crate::tools::sw_activate::activate_impl;
use crate::tools::sw_fetch::{SwFetchParams, fetch_impl};
use crate::tools::sw_status::status_impl;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use swcache_worker::{ClientRegistry, Worker};

/// The main MCP server handler for swcache.
#[derive(Clone)]
pub struct SwCacheServer {
    tool_router: ToolRouter<Self>,
    worker: Worker,
    clients: Arc<ClientRegistry>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl SwCacheServer {
    /// Create a new server handler around a worker and the registry it claims.
    pub fn new(worker: Worker, clients: Arc<ClientRegistry>) -> Self {
        Self { tool_router: Self::tool_router(), worker, clients }
    }

    /// Deliver a fetch event to the worker.
    #[tool(
        description = "Fetch a URL through the cache worker. Critical files are network-first, other GET requests are cache-first, tracking requests bypass the cache."
    )]
    async fn sw_fetch(&self, params: Parameters<SwFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.worker, &self.clients, params.0).await
    }

    /// Deliver the activate event, installing first if needed.
    #[tool(
        description = "Activate the worker: purge stale critical, tracking and page-route entries from the cache, then claim all open clients."
    )]
    async fn sw_activate(&self) -> Result<CallToolResult, McpError> {
        activate_impl(&self.worker).await
    }

    #[tool(description = "Report the worker version, lifecycle state, cache size and controlled clients.")]
    async fn sw_status(&self) -> Result<CallToolResult, McpError> {
        status_impl(&self.worker, &self.clients).await
    }

    #[tool(description = "List request keys stored in the worker's cache, optionally filtered by URL prefix.")]
    async fn cache_list(&self, params: Parameters<CacheListParams>) -> Result<CallToolResult, McpError> {
        list_impl(&self.worker, params.0).await
    }
}

impl ServerHandler for SwCacheServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "swcache".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::worker;

    #[test]
    fn test_router_lists_all_tools() {
        let (worker, clients, _) = worker();
        let server = SwCacheServer::new(worker, clients);

        let mut names: Vec<String> = server.tool_router.list_all().into_iter().map(|t| t.name.to_string()).collect();
        names.sort();

        assert_eq!(names, vec!["cache_list", "sw_activate", "sw_fetch", "sw_status"]);
    }

    #[test]
    fn test_server_info_name() {
        let (worker, clients, _) = worker();
        let info = SwCacheServer::new(worker, clients).get_info();
        assert_eq!(info.server_info.name, "swcache");
    }
}
