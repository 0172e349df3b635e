//! Request DTOs for the icon API
//!
//! Defines the query parameters of incoming icon requests.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::error::{IconError, Result};
use crate::imaging::DesiredSize;

/// Query string for `GET /icon`
///
/// # Fields
/// - `url`: Source icon URL; blank or missing yields the empty icon
/// - `width`, `height`: Desired size in pixels (default: configured icon size)
/// - `ttl`: Lifetime in seconds of a freshly cached icon (default: configured TTL)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IconQuery {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub ttl: Option<u64>,
}

impl IconQuery {
    /// Resolves the desired size, filling missing edges with `default_edge`.
    pub fn desired_size(&self, default_edge: u32) -> Result<DesiredSize> {
        DesiredSize::new(
            self.width.unwrap_or(default_edge),
            self.height.unwrap_or(default_edge),
        )
    }

    /// Resolves an explicit `ttl` into an absolute expiration.
    ///
    /// Returns None when no `ttl` was given so the service default applies.
    pub fn expires_at(&self) -> Result<Option<DateTime<Utc>>> {
        let Some(ttl) = self.ttl else {
            return Ok(None);
        };
        if ttl == 0 {
            return Err(IconError::InvalidRequest(
                "ttl must be greater than zero".to_string(),
            ));
        }

        let expires = i64::try_from(ttl)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .ok_or_else(|| IconError::InvalidRequest(format!("ttl {} is out of range", ttl)))?;
        Ok(Some(expires))
    }
}
