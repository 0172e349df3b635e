//! HTTP Fetcher
//!
//! Downloads icons with a shared reqwest client.

use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::error::{IconError, Result};
use crate::fetch::{ContentFetcher, USER_AGENT};

// == HTTP Fetcher ==
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    max_bytes: usize,
}

impl HttpFetcher {
    /// Creates a fetcher with the given per-request timeout and body limit.
    pub fn new(timeout: Duration, max_bytes: usize) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| IconError::Unexpected(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, max_bytes })
    }

    /// Creates a fetcher from the service configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            Duration::from_secs(config.fetch_timeout),
            config.max_download_bytes,
        )
    }

    fn too_large(&self, url: &Url) -> IconError {
        IconError::Transport(format!(
            "Response from {} exceeds {} bytes",
            url, self.max_bytes
        ))
    }
}

#[async_trait]
impl ContentFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<Bytes> {
        let mut response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(IconError::Transport(format!(
                "GET {} returned HTTP {}",
                url, status
            )));
        }

        if response
            .content_length()
            .is_some_and(|len| len > self.max_bytes as u64)
        {
            return Err(self.too_large(url));
        }

        // Stream the body so a lying or absent Content-Length cannot exceed the limit
        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > self.max_bytes {
                return Err(self.too_large(url));
            }
            body.extend_from_slice(&chunk);
        }

        debug!(%url, bytes = body.len(), "icon downloaded");
        Ok(body.freeze())
    }
}
