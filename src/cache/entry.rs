//! Cache Entry Module
//!
//! Defines a cached icon payload together with its freshness boundary.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::cache::store::Metadata;
use crate::cache::{CacheKey, EXPIRES_METADATA_KEY};

// == Cache Entry ==
/// A cached icon: canonical PNG bytes plus the instant they stop being fresh.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Store id
    pub key: CacheKey,
    /// Canonical raster encoding, never vector source bytes
    pub payload: Vec<u8>,
    /// Freshness boundary, None when the store carried no usable `Expires`
    pub expires_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry that stays fresh until `expires_at`.
    pub fn new(key: CacheKey, payload: Vec<u8>, expires_at: DateTime<Utc>) -> Self {
        Self {
            key,
            payload,
            expires_at: Some(expires_at),
        }
    }

    // == Is Fresh ==
    /// Checks whether the entry may be served at `now`.
    ///
    /// Boundary condition: an entry is fresh only while its expiration is
    /// strictly greater than `now`. An entry without an expiration is stale.
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires) => expires > now,
            None => false,
        }
    }

    /// Checks freshness against the current wall clock.
    pub fn is_fresh(&self) -> bool {
        self.is_fresh_at(Utc::now())
    }

    // == Metadata ==
    /// Builds the store metadata map carrying the `Expires` timestamp.
    pub fn metadata(&self) -> Metadata {
        let mut metadata = Metadata::new();
        if let Some(expires) = self.expires_at {
            metadata.insert(
                EXPIRES_METADATA_KEY.to_string(),
                Value::String(expires.to_rfc3339()),
            );
        }
        metadata
    }
}

// == Utility Functions ==
/// Reads the `Expires` timestamp out of a store metadata map.
///
/// Returns None when the key is absent or does not hold an RFC 3339 string.
pub fn expires_from_metadata(metadata: &Metadata) -> Option<DateTime<Utc>> {
    metadata
        .get(EXPIRES_METADATA_KEY)
        .and_then(Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|expires| expires.with_timezone(&Utc))
}
