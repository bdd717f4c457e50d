//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::{AppConfig, RoutePurge};
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `cache_name`, `version` or `user_agent` is empty
    /// - `script_url` is not an absolute http(s) URL
    /// - any unwanted marker is empty (it would match every URL)
    /// - `max_bytes` is 0 or exceeds 100MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_name.trim().is_empty() {
            return Err(ConfigError::Invalid { field: "cache_name".into(), reason: "must not be empty".into() });
        }

        if self.version.trim().is_empty() {
            return Err(ConfigError::Invalid { field: "version".into(), reason: "must not be empty".into() });
        }

        match url::Url::parse(&self.script_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(ConfigError::Invalid {
                    field: "script_url".into(),
                    reason: format!("unsupported scheme: {}", url.scheme()),
                });
            }
            Err(e) => {
                return Err(ConfigError::Invalid { field: "script_url".into(), reason: e.to_string() });
            }
        }

        if self.unwanted_markers.iter().any(|m| m.is_empty()) {
            return Err(ConfigError::Invalid {
                field: "unwanted_markers".into(),
                reason: "markers must not be empty strings".into(),
            });
        }

        if self.max_bytes == 0 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must be greater than 0".into() });
        }
        if self.max_bytes > 100 * 1024 * 1024 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must not exceed 100MB".into() });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.critical_files.is_empty() {
            tracing::warn!("critical_files is empty; every request will be served cache-first");
        }

        match self.route_purge {
            RoutePurge::Listed if self.route_paths.is_empty() => {
                tracing::warn!("route_purge is \"listed\" but route_paths is empty; no routes will be purged");
            }
            RoutePurge::Extensionless | RoutePurge::Off if !self.route_paths.is_empty() => {
                tracing::warn!(
                    route_paths_count = self.route_paths.len(),
                    "route_paths is set but ignored unless route_purge is \"listed\""
                );
            }
            _ => {}
        }

        Ok(())
    }
}
