//! API Handlers
//!
//! HTTP request handlers for each icon service endpoint.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};

use crate::cache::{BlobStore, DiskBlobStore};
use crate::config::Config;
use crate::error::Result;
use crate::fetch::{ContentFetcher, HttpFetcher};
use crate::imaging::DecodedImage;
use crate::models::{HealthResponse, IconQuery, StatsResponse};
use crate::service::{IconService, IconSource};

/// Response header naming where an icon came from
pub const ICON_SOURCE_HEADER: &str = "x-icon-source";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The icon cache
    pub service: Arc<IconService>,
    /// Edge length used when a request names no width or height
    pub default_icon_size: u32,
}

impl AppState {
    /// Creates a new AppState around an existing service.
    pub fn new(service: IconService, default_icon_size: u32) -> Self {
        Self {
            service: Arc::new(service),
            default_icon_size,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Opens the on-disk store under `cache_dir` and builds the HTTP fetcher.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let blobs: Arc<dyn BlobStore> = Arc::new(DiskBlobStore::open(&config.cache_dir).await?);
        let fetcher: Arc<dyn ContentFetcher> = Arc::new(HttpFetcher::from_config(config)?);
        let service = IconService::new(blobs, fetcher, config.default_ttl);
        Ok(Self::new(service, config.default_icon_size))
    }
}

/// Handler for GET /icon
///
/// Returns the icon for `url` as PNG. Download and decode failures still
/// answer 200 with the error icon; only bad query parameters are rejected.
pub async fn icon_handler(
    State(state): State<AppState>,
    Query(query): Query<IconQuery>,
) -> Result<Response> {
    let desired = query.desired_size(state.default_icon_size)?;
    let expires_at = query.expires_at()?;

    let outcome = state
        .service
        .icon_for(query.url.as_deref(), desired, expires_at)
        .await;

    png_response(&outcome.image, outcome.source)
}

/// Handler for GET /icon/empty
pub async fn empty_icon_handler(State(state): State<AppState>) -> Result<Response> {
    png_response(&state.service.empty_icon_image(), IconSource::Fallback)
}

/// Handler for GET /icon/error
pub async fn error_icon_handler(State(state): State<AppState>) -> Result<Response> {
    png_response(&state.service.error_icon_image(), IconSource::Fallback)
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let total_entries = state.service.cached_entries().await?;
    Ok(Json(StatsResponse::new(&state.service.stats(), total_entries)))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

fn png_response(image: &DecodedImage, source: IconSource) -> Result<Response> {
    let png = image.to_png()?;
    let headers = [
        (header::CONTENT_TYPE, HeaderValue::from_static("image/png")),
        (
            HeaderName::from_static(ICON_SOURCE_HEADER),
            HeaderValue::from_static(source.as_str()),
        ),
    ];
    Ok((headers, png).into_response())
}
