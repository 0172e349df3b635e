//! Error types for the icon cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Icon Error Enum ==
/// Unified error type for the icon cache.
///
/// `IconService::get_image` never surfaces these to its callers; they drive
/// the choice of log severity before the error icon is substituted.
#[derive(Error, Debug)]
pub enum IconError {
    /// Network unreachable, non-success HTTP status, timeout or oversized body
    #[error("Transport error: {0}")]
    Transport(String),

    /// URL is not a well-formed absolute http(s) URI
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Raster bytes failed to decode or the vector document failed to parse
    #[error("Decode error: {0}")]
    Decode(String),

    /// Persistent store I/O or metadata failure
    #[error("Store error: {0}")]
    Store(String),

    /// Invalid request data at the HTTP boundary
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Anything else
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl IconError {
    /// Returns true for failures that are expected in normal operation and
    /// are swallowed without a warning.
    pub fn is_transport(&self) -> bool {
        matches!(self, IconError::Transport(_))
    }
}

// == Conversions ==
impl From<reqwest::Error> for IconError {
    fn from(err: reqwest::Error) -> Self {
        IconError::Transport(err.to_string())
    }
}

impl From<image::ImageError> for IconError {
    fn from(err: image::ImageError) -> Self {
        IconError::Decode(err.to_string())
    }
}

impl From<resvg::usvg::Error> for IconError {
    fn from(err: resvg::usvg::Error) -> Self {
        IconError::Decode(format!("Failed to parse SVG: {}", err))
    }
}

impl From<std::io::Error> for IconError {
    fn from(err: std::io::Error) -> Self {
        IconError::Store(err.to_string())
    }
}

impl From<serde_json::Error> for IconError {
    fn from(err: serde_json::Error) -> Self {
        IconError::Store(err.to_string())
    }
}

impl From<tokio::task::JoinError> for IconError {
    fn from(err: tokio::task::JoinError) -> Self {
        IconError::Unexpected(format!("Transform task failed: {}", err))
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for IconError {
    fn into_response(self) -> Response {
        let status = match &self {
            IconError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the icon cache.
pub type Result<T> = std::result::Result<T, IconError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_request_is_bad_request() {
        let response = IconError::InvalidRequest("width must be > 0".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_store_error_is_internal() {
        let response = IconError::Store("disk full".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_io_error_maps_to_store() {
        let err: IconError = std::io::Error::new(std::io::ErrorKind::Other, "boom").into();
        assert!(matches!(err, IconError::Store(_)));
        assert!(!err.is_transport());
    }

    #[test]
    fn test_display_includes_detail() {
        let err = IconError::Transport("HTTP status 404".to_string());
        assert!(err.is_transport());
        assert_eq!(err.to_string(), "Transport error: HTTP status 404");
    }
}
