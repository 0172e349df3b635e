//! Fetch Module
//!
//! Retrieves raw icon bytes for a URL.

mod http;

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::error::Result;

pub use http::HttpFetcher;

/// User agent sent with every icon download
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Source of raw icon bytes.
///
/// Implementations are stateless with respect to the cache and need no
/// locking. Any failure to produce a successful body is an
/// [`IconError::Transport`](crate::error::IconError::Transport).
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<Bytes>;
}
