//! Persistent request/response cache store.
//!
//! The worker only sees the two traits below. Two backends implement them:
//!
//! - [`CacheDb`]: SQLite with async access via tokio-rusqlite, WAL mode,
//!   automatic schema migrations
//! - [`MemoryStorage`]: process-local maps, used by tests and embedders
//!   that do not need durability
//!
//! Both create a named cache lazily on first open and never delete it.

pub mod connection;
pub mod entries;
pub mod memory;
pub mod migrations;

use std::sync::Arc;

use async_trait::async_trait;

pub use crate::Error;
use crate::{RequestKey, Response};

pub use connection::CacheDb;
pub use entries::SqliteCache;
pub use memory::{MemoryCache, MemoryStorage};

/// Opens named caches.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Open the cache called `name`, creating it if it does not exist.
    async fn open(&self, name: &str) -> Result<Arc<dyn Cache>, Error>;
}

/// A single named cache: at most one response per request identity.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &RequestKey) -> Result<Option<Response>, Error>;

    /// Store `response` under `key`, replacing any previous entry.
    async fn put(&self, key: &RequestKey, response: &Response) -> Result<(), Error>;

    /// Remove the entry for `key`. Returns false if there was none.
    async fn delete(&self, key: &RequestKey) -> Result<bool, Error>;

    /// All keys currently stored, in no particular order.
    async fn keys(&self) -> Result<Vec<RequestKey>, Error>;
}
