//! In-memory cache store.
//!
//! Same semantics as the SQLite backend without durability. Uses a
//! HashMap behind a tokio RwLock for concurrent access.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Cache, CacheStorage};
use crate::{Error, RequestKey, Response};

/// In-memory [`CacheStorage`]. Clones share the same caches.
#[derive(Clone, Default, Debug)]
pub struct MemoryStorage {
    caches: Arc<RwLock<HashMap<String, Arc<MemoryCache>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `name` as the concrete type, for test setup and inspection.
    pub async fn cache(&self, name: &str) -> Arc<MemoryCache> {
        if let Some(cache) = self.caches.read().await.get(name) {
            return cache.clone();
        }

        self.caches
            .write()
            .await
            .entry(name.to_string())
            .or_default()
            .clone()
    }
}

#[async_trait]
impl CacheStorage for MemoryStorage {
    async fn open(&self, name: &str) -> Result<Arc<dyn Cache>, Error> {
        let cache: Arc<dyn Cache> = self.cache(name).await;
        Ok(cache)
    }
}

/// One named in-memory cache.
#[derive(Default, Debug)]
pub struct MemoryCache {
    entries: RwLock<HashMap<RequestKey, Response>>,
}

impl MemoryCache {
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn contains(&self, key: &RequestKey) -> bool {
        self.entries.read().await.contains_key(key)
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &RequestKey) -> Result<Option<Response>, Error> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &RequestKey, response: &Response) -> Result<(), Error> {
        self.entries.write().await.insert(key.clone(), response.clone());
        Ok(())
    }

    async fn delete(&self, key: &RequestKey) -> Result<bool, Error> {
        Ok(self.entries.write().await.remove(key).is_some())
    }

    async fn keys(&self) -> Result<Vec<RequestKey>, Error> {
        Ok(self.entries.read().await.keys().cloned().collect())
    }
}
