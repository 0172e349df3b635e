//! Cache Store Module
//!
//! The persistent blob store seam and the adapter that maps icon cache
//! entries onto it.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::entry::expires_from_metadata;
use crate::cache::{CacheEntry, CacheKey};
use crate::error::Result;

/// Per-blob metadata map. Carries at least `Expires` for cached icons.
pub type Metadata = BTreeMap<String, serde_json::Value>;

// == Stored Blob ==
/// A blob as returned by [`BlobStore::find`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredBlob {
    /// Human-readable name given at upload time (the source URL)
    pub display_name: String,
    /// Opaque payload bytes
    pub payload: Vec<u8>,
    /// Metadata map
    pub metadata: Metadata,
}

// == Blob Store ==
/// A persistent byte store keyed by string id.
///
/// Implementations do their own internal synchronization; callers in this
/// crate additionally serialize writes through the concurrency gate.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Returns true if a blob exists for `id`.
    async fn exists(&self, id: &str) -> Result<bool>;

    /// Returns the blob for `id`, if any.
    async fn find(&self, id: &str) -> Result<Option<StoredBlob>>;

    /// Creates or overwrites the payload for `id`.
    ///
    /// Existing metadata for `id` is preserved.
    async fn upload(&self, id: &str, display_name: &str, payload: &[u8]) -> Result<()>;

    /// Replaces the metadata map of an existing blob.
    async fn set_metadata(&self, id: &str, metadata: Metadata) -> Result<()>;

    /// Creates or overwrites both payload and metadata for `id`.
    ///
    /// All or nothing: on error the previous blob, if any, is unchanged.
    async fn upload_with_metadata(
        &self,
        id: &str,
        display_name: &str,
        payload: &[u8],
        metadata: Metadata,
    ) -> Result<()>;

    /// Returns the number of stored blobs.
    async fn len(&self) -> Result<usize>;
}

// == Memory Blob Store ==
/// Map-backed [`BlobStore`] for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, StoredBlob>>,
    uploads: AtomicUsize,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `upload` calls served so far.
    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn exists(&self, id: &str) -> Result<bool> {
        Ok(self.blobs.read().await.contains_key(id))
    }

    async fn find(&self, id: &str) -> Result<Option<StoredBlob>> {
        Ok(self.blobs.read().await.get(id).cloned())
    }

    async fn upload(&self, id: &str, display_name: &str, payload: &[u8]) -> Result<()> {
        let mut blobs = self.blobs.write().await;
        let blob = blobs.entry(id.to_string()).or_default();
        blob.display_name = display_name.to_string();
        blob.payload = payload.to_vec();
        self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn set_metadata(&self, id: &str, metadata: Metadata) -> Result<()> {
        let mut blobs = self.blobs.write().await;
        match blobs.get_mut(id) {
            Some(blob) => {
                blob.metadata = metadata;
                Ok(())
            }
            None => Err(crate::error::IconError::Store(format!(
                "Cannot set metadata on missing blob: {}",
                id
            ))),
        }
    }

    async fn upload_with_metadata(
        &self,
        id: &str,
        display_name: &str,
        payload: &[u8],
        metadata: Metadata,
    ) -> Result<()> {
        let blob = StoredBlob {
            display_name: display_name.to_string(),
            payload: payload.to_vec(),
            metadata,
        };
        self.blobs.write().await.insert(id.to_string(), blob);
        self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.blobs.read().await.len())
    }
}

// == Cache Store ==
/// Maps [`CacheEntry`] values onto a [`BlobStore`].
///
/// Performs no locking itself; the service holds the concurrency gate around
/// every call.
#[derive(Clone)]
pub struct CacheStore {
    blobs: Arc<dyn BlobStore>,
}

impl CacheStore {
    // == Constructor ==
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        Self { blobs }
    }

    // == Lookup ==
    /// Returns the entry stored under `key`, fresh or not.
    ///
    /// An entry whose metadata lacks a readable `Expires` comes back with
    /// `expires_at: None`, which is always stale.
    pub async fn lookup(&self, key: &CacheKey) -> Result<Option<CacheEntry>> {
        if !self.blobs.exists(key.as_str()).await? {
            return Ok(None);
        }

        let Some(blob) = self.blobs.find(key.as_str()).await? else {
            return Ok(None);
        };

        Ok(Some(CacheEntry {
            key: key.clone(),
            expires_at: expires_from_metadata(&blob.metadata),
            payload: blob.payload,
        }))
    }

    // == Write ==
    /// Creates or overwrites the entry together with its expiration.
    ///
    /// A failed write leaves any previous entry for the key as it was.
    pub async fn write(&self, entry: &CacheEntry) -> Result<()> {
        self.blobs
            .upload_with_metadata(
                entry.key.as_str(),
                entry.key.url(),
                &entry.payload,
                entry.metadata(),
            )
            .await?;
        debug!(key = %entry.key, bytes = entry.payload.len(), "cache entry written");
        Ok(())
    }

    // == Length ==
    /// Returns the number of stored entries.
    pub async fn len(&self) -> Result<usize> {
        self.blobs.len().await
    }
}
