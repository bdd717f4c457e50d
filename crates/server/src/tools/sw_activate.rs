//! sw_activate tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_worker::{Worker, WorkerState};

use crate::tools::json_result;

/// Output structure for sw_activate tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwActivateOutput {
    pub version: String,
    /// App shell entries precached by an install run as part of this call.
    pub precached: usize,
    /// Entries examined during cleanup.
    pub scanned: usize,
    pub deleted: usize,
    pub critical: usize,
    pub unwanted: usize,
    pub routes: usize,
    /// Clients now controlled by this version.
    pub claimed: usize,
    pub state: String,
}

/// Implementation of the sw_activate tool.
///
/// Installs first when the worker has not been installed yet, then runs the
/// activate event. Calling it again re-runs cleanup and claim.
pub async fn activate_impl(worker: &Worker) -> Result<CallToolResult, McpError> {
    let precached = if worker.state().await == WorkerState::Parsed { worker.install().await?.precached } else { 0 };

    let report = worker.activate().await?;
    let state = worker.state().await;

    json_result(&SwActivateOutput {
        version: report.version,
        precached,
        scanned: report.purge.scanned,
        deleted: report.purge.deleted(),
        critical: report.purge.critical,
        unwanted: report.purge.unwanted,
        routes: report.purge.routes,
        claimed: report.claimed,
        state: state.as_str().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{parse, worker};
    use swcache_core::{Cache, Request, Response};

    async fn seed(cache: &dyn Cache, urls: &[&str]) {
        for raw in urls {
            let key = Request::parse_get(raw).unwrap().key();
            cache.put(&key, &Response::new(*raw, 200, "old")).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_activate_purges_and_claims() {
        let (worker, clients, storage) = worker();
        clients.register("tab-1").await;
        let cache = storage.cache("swcache-dynamic-cache-v3").await;
        seed(
            cache.as_ref(),
            &[
                "https://example.com/index.html",
                "https://example.com/logo.png",
                "https://example.com/dashboard",
                "https://www.googletagmanager.com/gtm.js",
            ],
        )
        .await;

        let output: SwActivateOutput = parse(&activate_impl(&worker).await.unwrap());

        assert_eq!(output.scanned, 4);
        assert_eq!(output.deleted, 3);
        assert_eq!(output.critical, 1);
        assert_eq!(output.unwanted, 1);
        assert_eq!(output.routes, 1);
        assert_eq!(output.claimed, 1);
        assert_eq!(output.state, "activated");
        assert_eq!(clients.controller_of("tab-1").await.as_deref(), Some("v1"));
        assert_eq!(cache.keys().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_activate_twice_deletes_nothing_new() {
        let (worker, _, storage) = worker();
        let cache = storage.cache("swcache-dynamic-cache-v3").await;
        seed(cache.as_ref(), &["https://example.com/index.html"]).await;

        let first: SwActivateOutput = parse(&activate_impl(&worker).await.unwrap());
        let second: SwActivateOutput = parse(&activate_impl(&worker).await.unwrap());

        assert_eq!(first.deleted, 1);
        assert_eq!(second.deleted, 0);
        assert_eq!(second.scanned, 0);
    }

    #[tokio::test]
    async fn test_activate_empty_store() {
        let (worker, _, _) = worker();

        let output: SwActivateOutput = parse(&activate_impl(&worker).await.unwrap());

        assert_eq!(output.deleted, 0);
        assert_eq!(output.claimed, 0);
        assert_eq!(output.version, "v1");
    }
}
