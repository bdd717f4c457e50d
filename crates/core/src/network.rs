//! The network capability used by the worker.

use async_trait::async_trait;

use crate::{Error, Request, Response};

/// Performs a request against the real network.
///
/// Implementations return `Ok` for every HTTP status. `Err` is reserved for
/// failures where no response was delivered at all.
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response, Error>;
}
