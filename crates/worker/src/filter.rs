//! Third-party tracking request filter.

/// Matches request URLs against a fixed list of substring markers.
///
/// Matching requests are never intercepted, never stored, and purged on
/// activation if an older version stored them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnwantedFilter {
    markers: Vec<String>,
}

impl UnwantedFilter {
    /// Build a filter. Empty markers are dropped since they would match
    /// every URL.
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let markers = markers
            .into_iter()
            .map(Into::into)
            .filter(|m: &String| !m.is_empty())
            .collect();
        Self { markers }
    }

    /// The first marker contained in `url`, if any.
    pub fn matching_marker(&self, url: &str) -> Option<&str> {
        self.markers
            .iter()
            .find(|marker| url.contains(marker.as_str()))
            .map(String::as_str)
    }

    pub fn is_unwanted(&self, url: &str) -> bool {
        self.matching_marker(url).is_some()
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }
}
