//! Cache Key Module
//!
//! Derives the store id for a source URL.

use std::fmt;

use crate::cache::CACHE_KEY_PREFIX;

// == Cache Key ==
/// Store id for a cached icon: a fixed namespace prefix plus the source URL.
///
/// The requested size is deliberately not part of the key, so one URL maps
/// to exactly one entry whatever size it was first produced at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derives the key for `url`. The URL is used verbatim.
    pub fn for_url(url: &str) -> Self {
        Self(format!("{}{}", CACHE_KEY_PREFIX, url))
    }

    /// Returns the source URL this key was derived from.
    pub fn url(&self) -> &str {
        &self.0[CACHE_KEY_PREFIX.len()..]
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_has_namespace_prefix() {
        let key = CacheKey::for_url("https://example.com/icon.png");
        assert_eq!(key.as_str(), "imagecache/https://example.com/icon.png");
    }

    #[test]
    fn test_key_round_trips_url() {
        let key = CacheKey::for_url("https://example.com/a.svg?v=2");
        assert_eq!(key.url(), "https://example.com/a.svg?v=2");
    }

    #[test]
    fn test_distinct_urls_distinct_keys() {
        let a = CacheKey::for_url("https://example.com/a.png");
        let b = CacheKey::for_url("https://example.com/b.png");
        assert_ne!(a, b);
    }
}
