//! Response snapshots as served to clients and kept in the cache store.

use bytes::Bytes;

/// Status used for opaque cross-origin responses, whose real status is
/// hidden from the worker.
pub const OPAQUE_STATUS: u16 = 0;

/// A response snapshot.
///
/// Cloning shares the body buffer, so a copy can be written to the store
/// while the original is returned to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Final URL after redirects.
    pub url: String,
    pub status: u16,
    /// Header name/value pairs in the order received.
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl Response {
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<Bytes>) -> Self {
        Self { url: url.into(), status, headers: Vec::new(), body: body.into() }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn is_opaque(&self) -> bool {
        self.status == OPAQUE_STATUS
    }

    /// Whether a cache-first fetch may store this response: plain 200 or
    /// opaque. Redirects and error statuses pass through uncached.
    pub fn is_cacheable(&self) -> bool {
        self.status == 200 || self.is_opaque()
    }

    /// First header value matching `name`, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cacheable_statuses() {
        assert!(Response::new("https://example.com/a.js", 200, "x").is_cacheable());
        assert!(Response::new("https://cdn.example.net/a.js", 0, "").is_cacheable());
        assert!(!Response::new("https://example.com/a.js", 404, "").is_cacheable());
        assert!(!Response::new("https://example.com/a.js", 301, "").is_cacheable());
        assert!(!Response::new("https://example.com/a.js", 204, "").is_cacheable());
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let response = Response::new("https://example.com/", 200, "<html>").with_header("Content-Type", "text/html");
        assert_eq!(response.content_type(), Some("text/html"));
        assert_eq!(response.header("CONTENT-TYPE"), Some("text/html"));
        assert_eq!(response.header("etag"), None);
    }
}
