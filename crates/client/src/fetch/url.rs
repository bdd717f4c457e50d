//! Request URL resolution for the host runtime.
//!
//! Clients hand the host either absolute URLs or paths relative to the
//! page. Both become absolute http(s) URLs resolved against the worker
//! script URL.

use url::Url;

/// Error type for URL resolution failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Resolve a request URL string against `base`.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Inputs starting with `/`, `.` or `?` are joined onto `base`
/// 3. Other inputs without a scheme default to `https://`
/// 4. Remove fragment (#...)
/// 5. Keep query string intact (do not reorder)
pub fn resolve(input: &str, base: &Url) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = if trimmed.contains("://") {
        Url::parse(trimmed)
    } else if trimmed.starts_with(['/', '.', '?']) {
        base.join(trimmed)
    } else {
        Url::parse(&format!("https://{trimmed}"))
    }
    .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/sw.js").unwrap()
    }

    #[test]
    fn test_resolve_absolute() {
        let url = resolve("https://cdn.example.net/app.js", &base()).unwrap();
        assert_eq!(url.as_str(), "https://cdn.example.net/app.js");
    }

    #[test]
    fn test_resolve_root_relative() {
        let url = resolve("/dashboard", &base()).unwrap();
        assert_eq!(url.as_str(), "https://example.com/dashboard");
    }

    #[test]
    fn test_resolve_dot_relative_under_subpath() {
        let base = Url::parse("https://example.com/pool/sw.js").unwrap();
        let url = resolve("./index.html", &base).unwrap();
        assert_eq!(url.path(), "/pool/index.html");
    }

    #[test]
    fn test_resolve_default_scheme() {
        let url = resolve("example.com/logo.png", &base()).unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("example.com"));
    }

    #[test]
    fn test_resolve_lowercase_host() {
        let url = resolve("https://EXAMPLE.COM/a.js", &base()).unwrap();
        assert_eq!(url.host_str(), Some("example.com"));
    }

    #[test]
    fn test_resolve_remove_fragment_preserve_query() {
        let url = resolve("/index.html?b=2&a=1#top", &base()).unwrap();
        assert_eq!(url.fragment(), None);
        assert_eq!(url.query(), Some("b=2&a=1"));
    }

    #[test]
    fn test_resolve_unsupported_scheme() {
        let result = resolve("file:///etc/passwd", &base());
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_resolve_empty() {
        assert!(matches!(resolve("", &base()), Err(UrlError::Empty)));
        assert!(matches!(resolve("   ", &base()), Err(UrlError::Empty)));
    }
}
