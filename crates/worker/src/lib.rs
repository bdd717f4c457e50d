//! Cache-consistency policy for swcache.
//!
//! This crate decides, per request, whether to answer from the cache store
//! or the network, and cleans the store up when a new version activates:
//!
//! - [`paths`]: resolves critical identifiers against the script URL
//! - [`filter`]: recognizes third-party tracking requests
//! - [`lifecycle`]: activation cleanup followed by client claim
//! - [`dispatch`]: network-first for critical files, cache-first otherwise
//! - [`Worker`]: install/activate/fetch entry points for a host runtime

pub mod clients;
pub mod dispatch;
pub mod filter;
pub mod lifecycle;
pub mod paths;
pub mod policy;
pub mod worker;

#[cfg(test)]
mod testing;

pub use clients::{ClientRegistry, Clients};
pub use dispatch::{FetchOutcome, PassthroughReason, Served, Source, Strategy};
pub use filter::UnwantedFilter;
pub use lifecycle::{ActivationReport, PurgeReason, PurgeReport};
pub use paths::PathSet;
pub use policy::Policy;
pub use worker::{InstallReport, Worker, WorkerState};
