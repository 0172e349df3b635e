//! Icon Service
//!
//! The façade tying the gate, store, fetcher and transformer together:
//! lookup, freshness check, fetch on miss, transform, write back.
//!
//! # Concurrency
//! The gate is released before the download and re-entered exclusively for
//! the write, so a slow host never blocks readers of other icons. Two callers
//! racing on the same stale key may both download it; both produce the same
//! bytes and the last write wins.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};
use url::Url;

use crate::cache::{
    BlobStore, CacheEntry, CacheKey, CacheStats, CacheStore, ConcurrencyGate, StatsRecorder,
};
use crate::error::{IconError, Result};
use crate::fallback;
use crate::fetch::ContentFetcher;
use crate::imaging::{self, DecodedImage, DesiredSize, SourceKind};

/// Longest accepted default TTL (about a century)
const MAX_TTL_SECS: i64 = 100 * 365 * 24 * 60 * 60;

// == Icon Source ==
/// Where an icon returned by the service came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconSource {
    /// A fresh cache entry
    Cache,
    /// Downloaded and transformed by this call
    Network,
    /// A fallback icon
    Fallback,
}

impl IconSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            IconSource::Cache => "cache",
            IconSource::Network => "network",
            IconSource::Fallback => "fallback",
        }
    }
}

impl fmt::Display for IconSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An icon together with where it came from.
#[derive(Debug, Clone)]
pub struct IconOutcome {
    pub image: DecodedImage,
    pub source: IconSource,
}

// == Icon Service ==
pub struct IconService {
    store: CacheStore,
    fetcher: Arc<dyn ContentFetcher>,
    gate: ConcurrencyGate,
    stats: StatsRecorder,
    default_ttl: Duration,
}

impl IconService {
    // == Constructor ==
    /// Creates a service over `blobs`, downloading misses with `fetcher`.
    ///
    /// # Arguments
    /// * `blobs` - Persistent store for canonical icon bytes
    /// * `fetcher` - Source of raw icon bytes
    /// * `default_ttl_secs` - Lifetime used by [`icon_for`](Self::icon_for)
    ///   when the caller gives no expiration
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        fetcher: Arc<dyn ContentFetcher>,
        default_ttl_secs: u64,
    ) -> Self {
        Self {
            store: CacheStore::new(blobs),
            fetcher,
            gate: ConcurrencyGate::new(),
            stats: StatsRecorder::new(),
            default_ttl: Duration::seconds(
                i64::try_from(default_ttl_secs)
                    .unwrap_or(MAX_TTL_SECS)
                    .min(MAX_TTL_SECS),
            ),
        }
    }

    // == Get Image ==
    /// Returns the icon at `url`, sized for `desired`.
    ///
    /// Never fails: any error resolves to the error icon, and the store is left
    /// untouched.
    pub async fn get_image(
        &self,
        url: &str,
        desired: DesiredSize,
        expires_at: DateTime<Utc>,
    ) -> DecodedImage {
        self.get_image_with_source(url, desired, expires_at)
            .await
            .image
    }

    /// Like [`get_image`](Self::get_image), also reporting where the icon came from.
    pub async fn get_image_with_source(
        &self,
        url: &str,
        desired: DesiredSize,
        expires_at: DateTime<Utc>,
    ) -> IconOutcome {
        match self.load_image(url, desired, expires_at).await {
            Ok(outcome) => outcome,
            Err(err) => {
                self.stats.record_fallback();
                if err.is_transport() {
                    debug!(url, error = %err, "icon download failed");
                } else {
                    warn!(url, error = %err, "icon could not be loaded");
                }
                IconOutcome {
                    image: fallback::error_icon(),
                    source: IconSource::Fallback,
                }
            }
        }
    }

    /// Resolves an optional URL: blank or missing URLs get the empty icon
    /// without touching the store, everything else goes through
    /// [`get_image_with_source`](Self::get_image_with_source).
    ///
    /// `expires_at` defaults to now plus the configured TTL.
    pub async fn icon_for(
        &self,
        url: Option<&str>,
        desired: DesiredSize,
        expires_at: Option<DateTime<Utc>>,
    ) -> IconOutcome {
        let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) else {
            return IconOutcome {
                image: fallback::empty_icon(),
                source: IconSource::Fallback,
            };
        };

        let expires_at = expires_at.unwrap_or_else(|| self.default_expiration());
        self.get_image_with_source(url, desired, expires_at).await
    }

    // == Fallback Icons ==
    pub fn empty_icon_image(&self) -> DecodedImage {
        fallback::empty_icon()
    }

    pub fn error_icon_image(&self) -> DecodedImage {
        fallback::error_icon()
    }

    // == Stats ==
    /// Returns current counters.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    /// Returns the number of cached icons.
    pub async fn cached_entries(&self) -> Result<usize> {
        let token = self.gate.acquire_shared().await;
        let len = self.store.len().await;
        self.gate.release(token);
        len
    }

    /// Now plus the configured TTL.
    pub fn default_expiration(&self) -> DateTime<Utc> {
        Utc::now()
            .checked_add_signed(self.default_ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    // == Private Implementation ==
    async fn load_image(
        &self,
        url: &str,
        desired: DesiredSize,
        expires_at: DateTime<Utc>,
    ) -> Result<IconOutcome> {
        let parsed = parse_icon_url(url)?;
        let key = CacheKey::for_url(url);

        let token = self.gate.acquire_upgradeable().await;
        let found = self.store.lookup(&key).await;
        // Nothing is held across the download; the write re-enters exclusively
        let ticket = token.release_for_upgrade();

        if let Some(image) = fresh_image(&key, found?) {
            self.stats.record_hit();
            debug!(%key, "icon cache hit");
            return Ok(IconOutcome {
                image,
                source: IconSource::Cache,
            });
        }
        self.stats.record_miss();

        if expires_at <= Utc::now() {
            debug!(%key, %expires_at, "expiration already elapsed; entry will be stale on write");
        }

        let raw = self.download(&parsed).await?;
        let transformed = transform_off_thread(raw, SourceKind::from_url(url), desired).await?;
        let entry = CacheEntry::new(key, transformed.canonical, expires_at);

        let token = ticket.acquire_exclusive().await;
        let written = self.store.write(&entry).await;
        self.gate.release(token);
        written?;

        self.stats.record_write();
        info!(
            key = %entry.key,
            width = transformed.image.width(),
            height = transformed.image.height(),
            "icon cached"
        );

        Ok(IconOutcome {
            image: transformed.image,
            source: IconSource::Network,
        })
    }

    async fn download(&self, url: &Url) -> Result<Bytes> {
        self.stats.record_fetch();
        self.fetcher.fetch(url).await
    }
}

/// Decodes `entry` if it is present and fresh.
///
/// A fresh entry that fails to decode is treated as a miss.
fn fresh_image(key: &CacheKey, entry: Option<CacheEntry>) -> Option<DecodedImage> {
    let entry = entry?;
    if !entry.is_fresh() {
        debug!(%key, "icon cache entry is stale");
        return None;
    }

    match imaging::decode(&entry.payload) {
        Ok(image) => Some(image),
        Err(err) => {
            warn!(%key, error = %err, "cached icon is corrupt; fetching again");
            None
        }
    }
}

/// Parses `url` as an absolute http(s) URL.
fn parse_icon_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url)
        .map_err(|e| IconError::MalformedInput(format!("Invalid icon URL \"{}\": {}", url, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(IconError::MalformedInput(format!(
            "Unsupported scheme \"{}\" in icon URL \"{}\"",
            scheme, url
        ))),
    }
}

/// Runs the CPU-bound transform on the blocking pool.
async fn transform_off_thread(
    raw: Bytes,
    hint: SourceKind,
    desired: DesiredSize,
) -> Result<imaging::Transformed> {
    tokio::task::spawn_blocking(move || imaging::transform_to_image(&raw, hint, desired)).await?
}
