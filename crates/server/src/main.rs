//! swcache server entry point.
//!
//! Boots the cache worker for the configured version, runs its install and
//! activate events, then serves MCP on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use swcache_client::{FetchClient, FetchConfig};
use swcache_core::{AppConfig, CacheDb};
use swcache_worker::{ClientRegistry, Policy, Worker};
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("loading configuration")?;
    let policy = Policy::from_config(&config).context("building cache policy")?;

    let storage = CacheDb::open(&config.db_path)
        .await
        .with_context(|| format!("opening cache store at {}", config.db_path.display()))?;
    let network = FetchClient::new(FetchConfig::from(&config)).context("building HTTP client")?;
    let clients = Arc::new(ClientRegistry::new());

    let worker = Worker::new(policy, Arc::new(storage), Arc::new(network), clients.clone());

    match worker.start().await {
        Ok((install, activation)) => tracing::info!(
            version = %activation.version,
            precached = install.precached,
            purged = activation.purge.deleted(),
            "worker active"
        ),
        Err(e) => tracing::error!(version = %config.version, error = %e, "worker start failed; requests pass through"),
    }

    tracing::info!(cache = %config.cache_name, "Starting swcache server on stdio transport");

    let handler = handler::SwCacheServer::new(worker, clients);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
