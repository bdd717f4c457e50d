//! Per-request strategy selection.
//!
//! Critical requests go network-first so a reachable network always wins
//! over a cached copy. Everything else goes cache-first. Store failures on
//! this path are logged and never fail the request on their own.

use std::sync::Arc;

use serde::Serialize;
use swcache_core::{Cache, CacheStorage, Error, Network, Request, RequestKey, Response};

use crate::Policy;
use crate::paths::PathSet;

/// Why a request was left to the host's default network handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PassthroughReason {
    NonGet,
    Unwanted,
    /// The worker is not yet active.
    NotControlling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    NetworkFirst,
    CacheFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Network,
    Cache,
}

/// A response produced by the worker.
#[derive(Debug, Clone)]
pub struct Served {
    pub response: Response,
    pub source: Source,
    pub strategy: Strategy,
    /// Whether a copy of the response was written to the store.
    pub stored: bool,
}

#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Passthrough(PassthroughReason),
    Served(Served),
}

impl PassthroughReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            PassthroughReason::NonGet => "non_get",
            PassthroughReason::Unwanted => "unwanted",
            PassthroughReason::NotControlling => "not_controlling",
        }
    }
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::NetworkFirst => "network_first",
            Strategy::CacheFirst => "cache_first",
        }
    }
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Network => "network",
            Source::Cache => "cache",
        }
    }
}

impl FetchOutcome {
    pub fn served(&self) -> Option<&Served> {
        match self {
            FetchOutcome::Served(served) => Some(served),
            FetchOutcome::Passthrough(_) => None,
        }
    }
}

/// Whether `request` bypasses interception entirely.
pub fn passthrough_reason(policy: &Policy, request: &Request) -> Option<PassthroughReason> {
    if !request.is_get() {
        return Some(PassthroughReason::NonGet);
    }
    if policy.filter.is_unwanted(request.url.as_str()) {
        return Some(PassthroughReason::Unwanted);
    }
    None
}

pub fn strategy_for(critical: &PathSet, request: &Request) -> Strategy {
    if critical.matches(&request.url) { Strategy::NetworkFirst } else { Strategy::CacheFirst }
}

/// Handle one intercepted request.
///
/// # Errors
///
/// Returns `Error::FetchFailed` when a critical request fails on the network
/// and nothing is cached, and the network error itself when a cache-first
/// miss cannot be fetched.
pub async fn dispatch(
    policy: &Policy, storage: &dyn CacheStorage, network: &dyn Network, request: &Request,
) -> Result<FetchOutcome, Error> {
    if let Some(reason) = passthrough_reason(policy, request) {
        tracing::trace!(url = %request.url, ?reason, "not intercepting");
        return Ok(FetchOutcome::Passthrough(reason));
    }

    let cache = open_cache(storage, &policy.cache_name).await;
    let key = request.key();

    let served = match strategy_for(&policy.critical_paths(), request) {
        Strategy::NetworkFirst => network_first(cache.as_ref(), network, request, &key).await?,
        Strategy::CacheFirst => cache_first(cache.as_ref(), network, request, &key).await?,
    };

    Ok(FetchOutcome::Served(served))
}

async fn network_first(
    cache: Option<&Arc<dyn Cache>>, network: &dyn Network, request: &Request, key: &RequestKey,
) -> Result<Served, Error> {
    match network.fetch(request).await {
        Ok(response) => {
            let stored = store(cache, key, &response).await;
            Ok(Served { response, source: Source::Network, strategy: Strategy::NetworkFirst, stored })
        }
        Err(err) => {
            tracing::warn!(url = %request.url, error = %err, "network failed for critical file, serving from cache");
            match lookup(cache, key).await {
                Some(response) => {
                    Ok(Served { response, source: Source::Cache, strategy: Strategy::NetworkFirst, stored: false })
                }
                None => Err(Error::FetchFailed(format!("{}: {err}; no cached copy", request.url))),
            }
        }
    }
}

async fn cache_first(
    cache: Option<&Arc<dyn Cache>>, network: &dyn Network, request: &Request, key: &RequestKey,
) -> Result<Served, Error> {
    if let Some(response) = lookup(cache, key).await {
        return Ok(Served { response, source: Source::Cache, strategy: Strategy::CacheFirst, stored: false });
    }

    let response = network.fetch(request).await?;

    if !response.is_cacheable() {
        tracing::debug!(url = %request.url, status = response.status, "not caching response");
        return Ok(Served { response, source: Source::Network, strategy: Strategy::CacheFirst, stored: false });
    }

    let stored = store(cache, key, &response).await;
    Ok(Served { response, source: Source::Network, strategy: Strategy::CacheFirst, stored })
}

async fn open_cache(storage: &dyn CacheStorage, name: &str) -> Option<Arc<dyn Cache>> {
    match storage.open(name).await {
        Ok(cache) => Some(cache),
        Err(e) => {
            tracing::warn!(cache = name, error = %e, "cache unavailable; serving from network only");
            None
        }
    }
}

async fn lookup(cache: Option<&Arc<dyn Cache>>, key: &RequestKey) -> Option<Response> {
    let cache = cache?;
    match cache.get(key).await {
        Ok(found) => found,
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "cache read failed; treating as miss");
            None
        }
    }
}

async fn store(cache: Option<&Arc<dyn Cache>>, key: &RequestKey, response: &Response) -> bool {
    let Some(cache) = cache else {
        return false;
    };
    match cache.put(key, response).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "cache write failed");
            false
        }
    }
}
