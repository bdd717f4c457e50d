//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SWCACHE_*)
//! 2. TOML config file (if SWCACHE_CONFIG_FILE set)
//! 3. Built-in defaults
//!
//! Configuration is read once at startup. The worker turns it into an
//! immutable policy and never reloads it.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Which cached entries count as page routes during activation cleanup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutePurge {
    /// Any entry whose final path segment has no `.` is treated as a route.
    #[default]
    Extensionless,
    /// Only the identifiers in `route_paths` are treated as routes.
    Listed,
    /// Routes are never purged.
    Off,
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SWCACHE_*)
/// 2. TOML config file (if SWCACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Name of the single persistent cache container.
    ///
    /// Stays constant across versions; activation cleanup is what
    /// invalidates stale entries.
    #[serde(default = "default_cache_name")]
    pub cache_name: String,

    /// Deployment version tag. Only used for logging and client control.
    #[serde(default = "default_version")]
    pub version: String,

    /// Absolute URL of the worker script. Critical identifiers resolve
    /// against it.
    #[serde(default = "default_script_url")]
    pub script_url: String,

    /// Path to SQLite cache database.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Files that are always fetched network-first.
    #[serde(default = "default_critical_files")]
    pub critical_files: Vec<String>,

    /// Files precached when the worker installs.
    #[serde(default)]
    pub app_shell_files: Vec<String>,

    /// Substrings marking third-party tracking requests.
    #[serde(default = "default_unwanted_markers")]
    pub unwanted_markers: Vec<String>,

    /// Route invalidation policy used during activation.
    #[serde(default)]
    pub route_purge: RoutePurge,

    /// Route identifiers purged when `route_purge = "listed"`.
    #[serde(default)]
    pub route_paths: Vec<String>,

    /// User-Agent string for HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum bytes to fetch per request.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Maximum number of redirects to follow.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

fn default_cache_name() -> String {
    "swcache-dynamic-cache-v3".into()
}

fn default_version() -> String {
    "v1".into()
}

fn default_script_url() -> String {
    "http://127.0.0.1:8080/sw.js".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./swcache.sqlite")
}

fn default_critical_files() -> Vec<String> {
    ["./", "./index.html", "./game.html", "./manifest.json", "./logo192.png", "./favicon.ico", "./sw.js"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_unwanted_markers() -> Vec<String> {
    [
        "google-analytics.com",
        "googletagmanager.com",
        "google.com/gtag",
        "doubleclick.net",
        "googlesyndication.com",
        "connect.facebook.net",
        "facebook.com/tr",
        "platform.twitter.com",
        "hotjar.com",
        "clarity.ms",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_user_agent() -> String {
    "swcache/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_bytes() -> usize {
    10_485_760 // 10MB
}

fn default_max_redirects() -> usize {
    5
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_name: default_cache_name(),
            version: default_version(),
            script_url: default_script_url(),
            db_path: default_db_path(),
            critical_files: default_critical_files(),
            app_shell_files: Vec::new(),
            unwanted_markers: default_unwanted_markers(),
            route_purge: RoutePurge::default(),
            route_paths: Vec::new(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_bytes: default_max_bytes(),
            max_redirects: default_max_redirects(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SWCACHE_`
    /// 2. TOML file from `SWCACHE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SWCACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SWCACHE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        Self::from_figment(figment)
    }

    /// Extract and validate a configuration from an already-built figment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::LoadFailed` if extraction fails, or the
    /// validation error otherwise.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.cache_name, "swcache-dynamic-cache-v3");
        assert_eq!(config.db_path, PathBuf::from("./swcache.sqlite"));
        assert_eq!(config.user_agent, "swcache/0.1");
        assert_eq!(config.timeout_ms, 20_000);
        assert_eq!(config.route_purge, RoutePurge::Extensionless);
        assert!(config.critical_files.iter().any(|f| f == "./"));
        assert!(config.critical_files.iter().any(|f| f == "./manifest.json"));
        assert!(config.app_shell_files.is_empty());
        assert!(config.route_paths.is_empty());
    }

    #[test]
    fn test_default_markers_cover_gtag() {
        let config = AppConfig::default();
        let url = "https://www.google.com/gtag/js?id=G-123";
        assert!(config.unwanted_markers.iter().any(|m| url.contains(m.as_str())));
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
    }

    #[test]
    fn test_from_figment_toml_overrides() {
        let figment = Figment::from(Serialized::defaults(AppConfig::default())).merge(Toml::string(
            r#"
            version = "v1.917"
            route_purge = "listed"
            route_paths = ["./dashboard"]
            critical_files = ["./", "./index.html"]
            "#,
        ));

        let config = AppConfig::from_figment(figment).unwrap();
        assert_eq!(config.version, "v1.917");
        assert_eq!(config.route_purge, RoutePurge::Listed);
        assert_eq!(config.route_paths, vec!["./dashboard".to_string()]);
        assert_eq!(config.critical_files.len(), 2);
        assert_eq!(config.cache_name, "swcache-dynamic-cache-v3");
    }

    #[test]
    fn test_from_figment_rejects_invalid() {
        let figment =
            Figment::from(Serialized::defaults(AppConfig::default())).merge(Toml::string(r#"cache_name = """#));
        let result = AppConfig::from_figment(figment);
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "cache_name"));
    }
}
