//! Cache Module
//!
//! Persistent icon storage with time-based freshness, guarded by a single
//! shared/exclusive gate.

mod disk;
mod entry;
mod gate;
mod key;
mod stats;
mod store;


// Re-export public types
pub use disk::DiskBlobStore;
pub use entry::{expires_from_metadata, CacheEntry};
pub use gate::{
    ConcurrencyGate, ExclusiveToken, GateMode, GateToken, SharedToken, UpgradeTicket,
    UpgradeableToken,
};
pub use key::CacheKey;
pub use stats::{CacheStats, StatsRecorder};
pub use store::{BlobStore, CacheStore, MemoryBlobStore, Metadata, StoredBlob};

// == Public Constants ==
/// Namespace prefix of every cache key
pub const CACHE_KEY_PREFIX: &str = "imagecache/";

/// Metadata key holding an entry's expiration timestamp
pub const EXPIRES_METADATA_KEY: &str = "Expires";
