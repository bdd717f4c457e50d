//! sw_fetch tool implementation.
//!
//! Delivers one request to the worker as a fetch event. Requests the worker
//! does not intercept go straight to the network, like a browser's default
//! handling.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_client::resolve;
use swcache_core::{Error, Method, Request, Response};
use swcache_worker::{ClientRegistry, FetchOutcome, Worker};

use crate::error::ToolError;
use crate::tools::json_result;

/// Input parameters for sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchParams {
    /// Absolute URL, or a path resolved against the worker script URL.
    pub url: String,

    /// HTTP method (default: GET). Only GET is intercepted.
    #[serde(default = "default_method")]
    pub method: String,

    /// Client (tab) issuing the request (default: "default").
    #[serde(default = "default_client_id")]
    pub client_id: String,

    /// Include the response body as UTF-8 text.
    #[serde(default)]
    pub include_body: bool,
}

fn default_method() -> String {
    "GET".into()
}

fn default_client_id() -> String {
    "default".into()
}

/// Output structure for sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchOutput {
    /// The resolved request URL.
    pub url: String,
    /// The final URL of the response.
    pub final_url: String,
    pub method: String,
    pub status: u16,
    /// Whether the worker handled the request.
    pub intercepted: bool,
    /// Why the worker did not intercept, when it did not.
    pub passthrough_reason: Option<String>,
    /// "network" or "cache".
    pub source: String,
    /// "network_first" or "cache_first" for intercepted requests.
    pub strategy: Option<String>,
    /// Whether a copy was written to the cache store.
    pub stored: bool,
    /// Worker version controlling the client.
    pub controller: Option<String>,
    pub content_type: Option<String>,
    pub body_bytes: usize,
    pub body: Option<String>,
}

/// Implementation of the sw_fetch tool.
pub async fn fetch_impl(
    worker: &Worker, clients: &ClientRegistry, params: SwFetchParams,
) -> Result<CallToolResult, McpError> {
    let url = resolve(&params.url, &worker.policy().script_url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
    let method = Method::from_bytes(params.method.trim().to_ascii_uppercase().as_bytes())
        .map_err(|_| ToolError::InvalidInput(format!("unsupported method: {}", params.method)))?;
    let request = Request::new(method, url);

    let controller = clients.register(&params.client_id).await;

    let output = match worker.fetch(&request).await? {
        FetchOutcome::Served(served) => build_output(
            &request,
            &served.response,
            params.include_body,
            Outcome {
                passthrough_reason: None,
                source: served.source.as_str(),
                strategy: Some(served.strategy.as_str()),
                stored: served.stored,
                controller,
            },
        ),
        FetchOutcome::Passthrough(reason) => {
            tracing::debug!(url = %request.url, reason = reason.as_str(), "default network handling");
            let response = worker.network().fetch(&request).await?;
            build_output(
                &request,
                &response,
                params.include_body,
                Outcome {
                    passthrough_reason: Some(reason.as_str()),
                    source: "network",
                    strategy: None,
                    stored: false,
                    controller,
                },
            )
        }
    };

    json_result(&output)
}

struct Outcome {
    passthrough_reason: Option<&'static str>,
    source: &'static str,
    strategy: Option<&'static str>,
    stored: bool,
    controller: Option<String>,
}

fn build_output(request: &Request, response: &Response, include_body: bool, outcome: Outcome) -> SwFetchOutput {
    SwFetchOutput {
        url: request.url.to_string(),
        final_url: response.url.clone(),
        method: request.method.to_string(),
        status: response.status,
        intercepted: outcome.passthrough_reason.is_none(),
        passthrough_reason: outcome.passthrough_reason.map(String::from),
        source: outcome.source.to_string(),
        strategy: outcome.strategy.map(String::from),
        stored: outcome.stored,
        controller: outcome.controller,
        content_type: response.content_type().map(String::from),
        body_bytes: response.body.len(),
        body: include_body.then(|| String::from_utf8_lossy(&response.body).into_owned()),
    }
}
