//! Core types and shared functionality for swcache.
//!
//! This crate provides:
//! - Request/response model and request identity
//! - Cache store traits with SQLite and in-memory backends
//! - The `Network` capability used by the worker
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod network;
pub mod request;
pub mod response;

pub use cache::{Cache, CacheDb, CacheStorage, MemoryStorage};
pub use config::{AppConfig, ConfigError, RoutePurge};
pub use error::Error;
pub use http::Method;
pub use network::Network;
pub use request::{Request, RequestKey};
pub use response::Response;
