//! Immutable worker policy derived from configuration at startup.

use swcache_core::{AppConfig, Error, RoutePurge};
use url::Url;

use crate::filter::UnwantedFilter;
use crate::paths::PathSet;

/// Everything the worker decides with, fixed for the worker's lifetime.
#[derive(Debug, Clone)]
pub struct Policy {
    pub cache_name: String,
    pub version: String,
    /// Base every identifier resolves against.
    pub script_url: Url,
    pub critical_files: Vec<String>,
    pub app_shell_files: Vec<String>,
    pub filter: UnwantedFilter,
    pub route_purge: RoutePurge,
    pub route_paths: Vec<String>,
}

impl Policy {
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let script_url = Url::parse(&config.script_url)
            .map_err(|e| Error::InvalidUrl(format!("script_url {}: {e}", config.script_url)))?;

        Ok(Self {
            cache_name: config.cache_name.clone(),
            version: config.version.clone(),
            script_url,
            critical_files: config.critical_files.clone(),
            app_shell_files: config.app_shell_files.clone(),
            filter: UnwantedFilter::new(config.unwanted_markers.iter().cloned()),
            route_purge: config.route_purge,
            route_paths: config.route_paths.clone(),
        })
    }

    /// Resolve the critical set against the script URL.
    pub fn critical_paths(&self) -> PathSet {
        PathSet::resolve(&self.critical_files, &self.script_url)
    }

    /// Absolute URLs of the app shell, in configured order.
    pub fn app_shell_urls(&self) -> Result<Vec<Url>, Error> {
        self.app_shell_files
            .iter()
            .map(|id| {
                self.script_url
                    .join(id)
                    .map_err(|e| Error::InvalidUrl(format!("app shell entry {id}: {e}")))
            })
            .collect()
    }

    /// Matcher for rule (c) of activation cleanup.
    pub fn route_matcher(&self) -> RouteMatcher {
        match self.route_purge {
            RoutePurge::Extensionless => RouteMatcher::Extensionless,
            RoutePurge::Listed => RouteMatcher::Listed(PathSet::resolve(&self.route_paths, &self.script_url)),
            RoutePurge::Off => RouteMatcher::Off,
        }
    }
}

/// Decides whether a cached path is a page route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteMatcher {
    Extensionless,
    Listed(PathSet),
    Off,
}

impl RouteMatcher {
    pub fn matches(&self, path: &str) -> bool {
        match self {
            RouteMatcher::Extensionless => is_extensionless(path),
            RouteMatcher::Listed(paths) => paths.contains_path(path),
            RouteMatcher::Off => false,
        }
    }
}

/// True when the final path segment has no `.`, e.g. `/dashboard` or `/`.
pub fn is_extensionless(path: &str) -> bool {
    path.rsplit('/').next().is_none_or(|segment| !segment.contains('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_default_config() {
        let policy = Policy::from_config(&AppConfig::default()).unwrap();
        let critical = policy.critical_paths();

        assert!(critical.contains_path("/"));
        assert!(critical.contains_path("/index.html"));
        assert!(critical.contains_path("/sw.js"));
        assert!(policy.filter.is_unwanted("https://www.googletagmanager.com/gtm.js"));
    }

    #[test]
    fn test_invalid_script_url() {
        let config = AppConfig { script_url: "not a url".into(), ..Default::default() };
        assert!(matches!(Policy::from_config(&config), Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_app_shell_urls() {
        let config = AppConfig {
            script_url: "https://example.com/pool/sw.js".into(),
            app_shell_files: vec!["./assets/table.png".into(), "/fonts/ui.woff2".into()],
            ..Default::default()
        };
        let policy = Policy::from_config(&config).unwrap();
        let urls = policy.app_shell_urls().unwrap();

        assert_eq!(urls[0].as_str(), "https://example.com/pool/assets/table.png");
        assert_eq!(urls[1].as_str(), "https://example.com/fonts/ui.woff2");
    }

    #[test]
    fn test_is_extensionless() {
        assert!(is_extensionless("/dashboard"));
        assert!(is_extensionless("/settings/profile"));
        assert!(is_extensionless("/"));
        assert!(is_extensionless("/app/"));
        assert!(!is_extensionless("/logo.png"));
        assert!(!is_extensionless("/static/js/main.3f2a.js"));
    }

    #[test]
    fn test_listed_routes() {
        let config = AppConfig {
            route_purge: RoutePurge::Listed,
            route_paths: vec!["./dashboard".into()],
            ..Default::default()
        };
        let matcher = Policy::from_config(&config).unwrap().route_matcher();

        assert!(matcher.matches("/dashboard"));
        assert!(!matcher.matches("/settings"));
    }

    #[test]
    fn test_routes_off() {
        let config = AppConfig { route_purge: RoutePurge::Off, ..Default::default() };
        let matcher = Policy::from_config(&config).unwrap().route_matcher();
        assert!(!matcher.matches("/dashboard"));
    }
}
