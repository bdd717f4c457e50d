//! Resolution of application-relative identifiers into absolute paths.
//!
//! Identifiers such as `./index.html` are relative to the worker script,
//! not to whatever page is currently open. They are joined onto the script
//! URL and only the path component is kept, so membership tests ignore
//! query strings and origins.

use std::collections::BTreeSet;

use url::Url;

/// Resolve one identifier against `base`, returning its absolute path.
///
/// `./` yields the directory containing the script (the site root `/` for a
/// script served at the top level), never an empty string.
pub fn resolve_path(identifier: &str, base: &Url) -> Option<String> {
    match base.join(identifier) {
        Ok(url) => Some(url.path().to_string()),
        Err(e) => {
            tracing::warn!(identifier, base = %base, error = %e, "skipping unresolvable identifier");
            None
        }
    }
}

/// A set of resolved absolute paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathSet {
    paths: BTreeSet<String>,
}

impl PathSet {
    /// Resolve every identifier against `base`. Identifiers that fail to
    /// resolve are logged and left out.
    pub fn resolve<S: AsRef<str>>(identifiers: &[S], base: &Url) -> Self {
        let paths = identifiers
            .iter()
            .filter_map(|id| resolve_path(id.as_ref(), base))
            .collect();
        Self { paths }
    }

    pub fn contains_path(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    /// Whether the path of `url` is in the set. Query and fragment are ignored.
    pub fn matches(&self, url: &Url) -> bool {
        self.contains_path(url.path())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root_script() -> Url {
        Url::parse("https://example.com/sw.js").unwrap()
    }

    #[test]
    fn test_current_directory_is_site_root() {
        assert_eq!(resolve_path("./", &root_script()).as_deref(), Some("/"));
    }

    #[test]
    fn test_current_directory_under_subpath() {
        let base = Url::parse("https://example.github.io/pool/sw.js").unwrap();
        assert_eq!(resolve_path("./", &base).as_deref(), Some("/pool/"));
        assert_eq!(resolve_path("./index.html", &base).as_deref(), Some("/pool/index.html"));
    }

    #[test]
    fn test_identifier_query_is_dropped() {
        assert_eq!(resolve_path("./manifest.json?v=7", &root_script()).as_deref(), Some("/manifest.json"));
    }

    #[test]
    fn test_absolute_identifier_kept() {
        assert_eq!(resolve_path("/game.html", &root_script()).as_deref(), Some("/game.html"));
    }

    #[test]
    fn test_default_critical_set() {
        let ids = ["./", "./index.html", "./game.html", "./manifest.json"];
        let set = PathSet::resolve(&ids, &root_script());

        assert_eq!(set.len(), 4);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["/", "/game.html", "/index.html", "/manifest.json"]);
    }

    #[test]
    fn test_matches_ignores_query_and_origin() {
        let set = PathSet::resolve(&["./index.html"], &root_script());

        assert!(set.matches(&Url::parse("https://example.com/index.html?utm=1").unwrap()));
        assert!(set.matches(&Url::parse("http://localhost:3000/index.html").unwrap()));
        assert!(!set.matches(&Url::parse("https://example.com/index.htm").unwrap()));
    }

    #[test]
    fn test_empty_set() {
        let set = PathSet::resolve::<&str>(&[], &root_script());
        assert!(set.is_empty());
        assert!(!set.contains_path("/"));
    }
}
