//! Cache cleanup performed when a new version activates.
//!
//! Every stored entry is checked against three rules, in order:
//!
//! 1. its path is a critical path (query ignored)
//! 2. its URL contains an unwanted marker
//! 3. its path is a page route according to the route policy
//!
//! The first matching rule wins and the entry is deleted once. Deletions run
//! concurrently and are all joined before any client is claimed, so no client
//! is handed to this version while stale critical entries remain.

use std::sync::Arc;

use futures_util::future::try_join_all;
use serde::Serialize;
use swcache_core::{Cache, CacheStorage, Error, RequestKey};

use crate::Policy;
use crate::clients::Clients;
use crate::filter::UnwantedFilter;
use crate::paths::PathSet;
use crate::policy::RouteMatcher;

/// Why an entry was purged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PurgeReason {
    Critical,
    Unwanted,
    Route,
}

/// Counts from one cleanup pass. Only entries actually removed are counted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PurgeReport {
    pub scanned: usize,
    pub critical: usize,
    pub unwanted: usize,
    pub routes: usize,
}

impl PurgeReport {
    pub fn deleted(&self) -> usize {
        self.critical + self.unwanted + self.routes
    }

    fn record(&mut self, reason: PurgeReason) {
        match reason {
            PurgeReason::Critical => self.critical += 1,
            PurgeReason::Unwanted => self.unwanted += 1,
            PurgeReason::Route => self.routes += 1,
        }
    }
}

/// Outcome of a completed activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivationReport {
    pub version: String,
    pub purge: PurgeReport,
    /// Clients now controlled by this version.
    pub claimed: usize,
}

/// Rules applied to each stored key.
#[derive(Debug, Clone)]
pub struct PurgeRules {
    pub critical: PathSet,
    pub filter: UnwantedFilter,
    pub routes: RouteMatcher,
}

impl PurgeRules {
    pub fn from_policy(policy: &Policy) -> Self {
        Self { critical: policy.critical_paths(), filter: policy.filter.clone(), routes: policy.route_matcher() }
    }

    /// First rule `key` violates, if any.
    ///
    /// Keys whose URL does not parse can still match the marker rule, which
    /// works on the raw string.
    pub fn classify(&self, key: &RequestKey) -> Option<PurgeReason> {
        let url = key.parsed_url();

        if url.as_ref().is_some_and(|u| self.critical.matches(u)) {
            return Some(PurgeReason::Critical);
        }
        if self.filter.is_unwanted(&key.url) {
            return Some(PurgeReason::Unwanted);
        }
        if url.as_ref().is_some_and(|u| self.routes.matches(u.path())) {
            return Some(PurgeReason::Route);
        }
        None
    }
}

/// Delete every entry in `cache` that `rules` classify as stale.
pub async fn purge(cache: Arc<dyn Cache>, rules: &PurgeRules) -> Result<PurgeReport, Error> {
    let keys = cache.keys().await?;
    let mut report = PurgeReport { scanned: keys.len(), ..Default::default() };

    let doomed: Vec<(RequestKey, PurgeReason)> = keys
        .into_iter()
        .filter_map(|key| rules.classify(&key).map(|reason| (key, reason)))
        .collect();

    let deletions = doomed.into_iter().map(|(key, reason)| {
        let cache = cache.clone();
        async move {
            let removed = cache.delete(&key).await?;
            tracing::debug!(key = %key, ?reason, removed, "purged cache entry");
            Ok::<_, Error>((reason, removed))
        }
    });

    for (reason, removed) in try_join_all(deletions).await? {
        if removed {
            report.record(reason);
        }
    }

    Ok(report)
}

/// Run activation cleanup for `policy`, then claim clients.
///
/// # Errors
///
/// Fails if the cache cannot be opened or listed, or if a deletion fails.
/// Clients are not claimed in that case.
pub async fn activate(
    policy: &Policy, storage: &dyn CacheStorage, clients: &dyn Clients,
) -> Result<ActivationReport, Error> {
    tracing::info!(version = %policy.version, cache = %policy.cache_name, "activating");

    let cache = storage.open(&policy.cache_name).await.inspect_err(|e| {
        tracing::error!(version = %policy.version, error = %e, "cache open failed; activation aborted");
    })?;

    let rules = PurgeRules::from_policy(policy);
    let purge = purge(cache, &rules).await?;

    tracing::info!(
        version = %policy.version,
        scanned = purge.scanned,
        critical = purge.critical,
        unwanted = purge.unwanted,
        routes = purge.routes,
        "stale entries deleted; claiming clients"
    );

    let claimed = clients.claim(&policy.version).await?;

    Ok(ActivationReport { version: policy.version.clone(), purge, claimed })
}
