//! Lifecycle event entry points.
//!
//! The host runtime drives a [`Worker`] through `install`, `activate` and
//! `fetch`. Install and activate are serialized; fetches run concurrently
//! with each other and only see the lifecycle state.

use std::sync::Arc;

use futures_util::future::try_join_all;
use serde::Serialize;
use swcache_core::{CacheStorage, Error, Network, Request, RequestKey};
use tokio::sync::{Mutex, RwLock};

use crate::Policy;
use crate::clients::Clients;
use crate::dispatch::{self, FetchOutcome, PassthroughReason};
use crate::lifecycle::{self, ActivationReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    /// Created, not yet installed.
    Parsed,
    Installed,
    Activating,
    /// Controlling clients and intercepting fetches.
    Activated,
}

impl WorkerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerState::Parsed => "parsed",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Activated => "activated",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallReport {
    pub version: String,
    /// App shell entries written to the store.
    pub precached: usize,
    /// Always set: a new version takes over without waiting for old clients
    /// to close.
    pub skip_waiting: bool,
}

struct Inner {
    policy: Policy,
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
    clients: Arc<dyn Clients>,
    state: RwLock<WorkerState>,
    transition: Mutex<()>,
}

/// A cache proxy worker for one deployed version. Clones share state.
#[derive(Clone)]
pub struct Worker {
    inner: Arc<Inner>,
}

impl Worker {
    pub fn new(
        policy: Policy, storage: Arc<dyn CacheStorage>, network: Arc<dyn Network>, clients: Arc<dyn Clients>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                policy,
                storage,
                network,
                clients,
                state: RwLock::new(WorkerState::Parsed),
                transition: Mutex::new(()),
            }),
        }
    }

    pub fn policy(&self) -> &Policy {
        &self.inner.policy
    }

    pub fn storage(&self) -> &Arc<dyn CacheStorage> {
        &self.inner.storage
    }

    /// The network capability, for requests the worker passes through.
    pub fn network(&self) -> &Arc<dyn Network> {
        &self.inner.network
    }

    pub async fn state(&self) -> WorkerState {
        *self.inner.state.read().await
    }

    async fn set_state(&self, next: WorkerState) {
        let mut state = self.inner.state.write().await;
        if *state != next {
            tracing::debug!(version = %self.inner.policy.version, from = ?*state, to = ?next, "worker state");
            *state = next;
        }
    }

    /// Handle the install event: precache the app shell and request
    /// immediate activation.
    ///
    /// # Errors
    ///
    /// Fails if the store cannot be opened while there is an app shell to
    /// precache, or if any app shell entry cannot be fetched with a
    /// cacheable status. The worker stays in its previous state.
    pub async fn install(&self) -> Result<InstallReport, Error> {
        let _guard = self.inner.transition.lock().await;
        let policy = &self.inner.policy;
        tracing::info!(version = %policy.version, "installing");

        let precached = self.precache().await?;

        if self.state().await == WorkerState::Parsed {
            self.set_state(WorkerState::Installed).await;
        }

        Ok(InstallReport { version: policy.version.clone(), precached, skip_waiting: true })
    }

    /// Fetch every app shell entry, then store them all. Nothing is stored
    /// unless every fetch succeeds, and a failed write removes the entries
    /// already written by this pass.
    async fn precache(&self) -> Result<usize, Error> {
        let policy = &self.inner.policy;
        let urls = policy.app_shell_urls()?;
        if urls.is_empty() {
            return Ok(0);
        }

        let cache = self.inner.storage.open(&policy.cache_name).await?;
        let network = self.inner.network.as_ref();

        let fetched = try_join_all(urls.into_iter().map(|url| async move {
            let request = Request::get(url);
            let response = network.fetch(&request).await?;
            if !response.is_cacheable() {
                return Err(Error::FetchFailed(format!("precache {}: status {}", request.url, response.status)));
            }
            Ok::<_, Error>((request.key(), response))
        }))
        .await?;

        let mut written = Vec::with_capacity(fetched.len());
        for (key, response) in &fetched {
            if let Err(e) = cache.put(key, response).await {
                tracing::warn!(version = %policy.version, url = %key.url, error = %e, "precache write failed");
                for key in written {
                    if let Err(e) = cache.delete(key).await {
                        tracing::warn!(url = %key.url, error = %e, "precache rollback failed");
                    }
                }
                return Err(e);
            }
            written.push(key);
        }

        tracing::info!(version = %policy.version, count = fetched.len(), "app shell precached");
        Ok(fetched.len())
    }

    /// Handle the activate event: purge stale entries, then claim clients.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidState` before install. Cleanup failures are
    /// returned as-is and restore the state held before the attempt: an
    /// installed worker stays installed, an active one keeps control.
    pub async fn activate(&self) -> Result<ActivationReport, Error> {
        let _guard = self.inner.transition.lock().await;
        let previous = self.state().await;
        if previous == WorkerState::Parsed {
            return Err(Error::InvalidState("activate received before install".into()));
        }

        self.set_state(WorkerState::Activating).await;

        let inner = &self.inner;
        match lifecycle::activate(&inner.policy, inner.storage.as_ref(), inner.clients.as_ref()).await {
            Ok(report) => {
                self.set_state(WorkerState::Activated).await;
                Ok(report)
            }
            Err(e) => {
                self.set_state(previous).await;
                Err(e)
            }
        }
    }

    /// Install then activate, as a host does for a freshly registered
    /// version that skips waiting.
    pub async fn start(&self) -> Result<(InstallReport, ActivationReport), Error> {
        let install = self.install().await?;
        let activation = self.activate().await?;
        Ok((install, activation))
    }

    /// Handle a fetch event.
    pub async fn fetch(&self, request: &Request) -> Result<FetchOutcome, Error> {
        if self.state().await != WorkerState::Activated {
            return Ok(FetchOutcome::Passthrough(PassthroughReason::NotControlling));
        }
        let inner = &self.inner;
        dispatch::dispatch(&inner.policy, inner.storage.as_ref(), inner.network.as_ref(), request).await
    }

    /// Keys currently in this worker's cache.
    pub async fn cached_keys(&self) -> Result<Vec<RequestKey>, Error> {
        let cache = self.inner.storage.open(&self.inner.policy.cache_name).await?;
        let mut keys = cache.keys().await?;
        keys.sort();
        Ok(keys)
    }
}
