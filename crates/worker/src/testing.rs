//! Fakes shared by the worker tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use swcache_core::{
    AppConfig, Cache, CacheStorage, Error, MemoryStorage, Network, Request, RequestKey, Response, cache::MemoryCache,
};
use tokio::sync::RwLock;
use url::Url;

use crate::Policy;

pub const SCRIPT_URL: &str = "https://example.com/sw.js";

/// Policy with the four-entry critical set used across the scenarios.
pub fn policy() -> Policy {
    let config = AppConfig {
        script_url: SCRIPT_URL.into(),
        version: "v2".into(),
        cache_name: "test-cache".into(),
        critical_files: vec!["./".into(), "./index.html".into(), "./game.html".into(), "./manifest.json".into()],
        ..Default::default()
    };
    Policy::from_config(&config).unwrap()
}

pub fn url(path_or_url: &str) -> Url {
    Url::parse(SCRIPT_URL).unwrap().join(path_or_url).unwrap()
}

pub fn key(path_or_url: &str) -> RequestKey {
    RequestKey::get(&url(path_or_url))
}

pub fn response(path_or_url: &str, status: u16, body: &str) -> Response {
    Response::new(url(path_or_url).as_str(), status, body.to_string())
}

/// Seed `storage`'s test cache with one 200 entry per path.
pub async fn seed(storage: &MemoryStorage, paths: &[&str]) -> Arc<MemoryCache> {
    let cache = storage.cache("test-cache").await;
    for path in paths {
        cache
            .put(&key(path), &response(path, 200, &format!("cached {path}")))
            .await
            .unwrap();
    }
    cache
}

/// Network that answers from a fixed table and counts calls. URLs without
/// an entry fail as if the network were down.
#[derive(Default)]
pub struct ScriptedNetwork {
    routes: RwLock<HashMap<String, Response>>,
    calls: AtomicUsize,
}

impl ScriptedNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn serve(&self, path_or_url: &str, status: u16, body: &str) {
        let url = url(path_or_url);
        self.routes
            .write()
            .await
            .insert(url.to_string(), Response::new(url.as_str(), status, body.to_string()));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Network for ScriptedNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.routes
            .read()
            .await
            .get(request.url.as_str())
            .cloned()
            .ok_or_else(|| Error::Network(format!("offline: {}", request.url)))
    }
}

/// Storage whose open always fails.
pub struct BrokenStorage;

#[async_trait]
impl CacheStorage for BrokenStorage {
    async fn open(&self, name: &str) -> Result<Arc<dyn Cache>, Error> {
        Err(Error::CacheOpen(format!("{name}: quota exceeded")))
    }
}

/// Storage over a [`MemoryStorage`] that fails once its open or write
/// budget runs out.
pub struct FlakyStorage {
    storage: MemoryStorage,
    opens_left: AtomicUsize,
    puts_left: Arc<AtomicUsize>,
}

impl FlakyStorage {
    pub fn new(storage: MemoryStorage, opens: usize, puts: usize) -> Self {
        Self { storage, opens_left: AtomicUsize::new(opens), puts_left: Arc::new(AtomicUsize::new(puts)) }
    }
}

fn take(budget: &AtomicUsize) -> bool {
    budget.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1)).is_ok()
}

#[async_trait]
impl CacheStorage for FlakyStorage {
    async fn open(&self, name: &str) -> Result<Arc<dyn Cache>, Error> {
        if !take(&self.opens_left) {
            return Err(Error::CacheOpen(format!("{name}: quota exceeded")));
        }
        Ok(Arc::new(FlakyCache { cache: self.storage.cache(name).await, puts_left: self.puts_left.clone() }))
    }
}

struct FlakyCache {
    cache: Arc<MemoryCache>,
    puts_left: Arc<AtomicUsize>,
}

#[async_trait]
impl Cache for FlakyCache {
    async fn get(&self, key: &RequestKey) -> Result<Option<Response>, Error> {
        self.cache.get(key).await
    }

    async fn put(&self, key: &RequestKey, response: &Response) -> Result<(), Error> {
        if !take(&self.puts_left) {
            return Err(Error::CacheOpen(format!("{key}: quota exceeded")));
        }
        self.cache.put(key, response).await
    }

    async fn delete(&self, key: &RequestKey) -> Result<bool, Error> {
        self.cache.delete(key).await
    }

    async fn keys(&self) -> Result<Vec<RequestKey>, Error> {
        self.cache.keys().await
    }
}
