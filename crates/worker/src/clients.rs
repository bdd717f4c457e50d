//! Open clients and which worker version controls them.

use std::collections::BTreeMap;

use async_trait::async_trait;
use swcache_core::Error;
use tokio::sync::RwLock;

/// Transfers control of already-open clients to a worker version.
#[async_trait]
pub trait Clients: Send + Sync {
    /// Make `version` the controller of every open client. Returns how
    /// many clients are now controlled by it.
    async fn claim(&self, version: &str) -> Result<usize, Error>;
}

#[derive(Debug, Default)]
struct RegistryState {
    /// Version that claimed clients most recently.
    active: Option<String>,
    /// Client id to controlling version.
    clients: BTreeMap<String, Option<String>>,
}

/// In-process client registry.
///
/// A client registered after a claim is controlled by the active version
/// straight away, like a page opened under an already-active worker.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    state: RwLock<RegistryState>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `id` if unseen. Returns the version controlling it.
    pub async fn register(&self, id: &str) -> Option<String> {
        let mut state = self.state.write().await;
        let active = state.active.clone();
        state.clients.entry(id.to_string()).or_insert(active).clone()
    }

    pub async fn controller_of(&self, id: &str) -> Option<String> {
        self.state.read().await.clients.get(id).cloned().flatten()
    }

    pub async fn active_version(&self) -> Option<String> {
        self.state.read().await.active.clone()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.clients.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.clients.is_empty()
    }

    /// Number of clients controlled by `version`.
    pub async fn controlled_by(&self, version: &str) -> usize {
        self.state
            .read()
            .await
            .clients
            .values()
            .filter(|v| v.as_deref() == Some(version))
            .count()
    }
}

#[async_trait]
impl Clients for ClientRegistry {
    async fn claim(&self, version: &str) -> Result<usize, Error> {
        let mut state = self.state.write().await;
        state.active = Some(version.to_string());
        for controller in state.clients.values_mut() {
            *controller = Some(version.to_string());
        }
        Ok(state.clients.len())
    }
}
