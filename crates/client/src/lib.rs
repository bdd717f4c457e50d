//! Network client for swcache.
//!
//! This crate provides the reqwest-backed [`Network`](swcache_core::Network)
//! implementation and request URL resolution used by the host runtime.

pub mod fetch;

pub use fetch::{FetchClient, FetchConfig, UrlError, resolve};
