//! Request and Response models for the icon API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! deserializing query strings and serializing JSON response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::IconQuery;
pub use responses::{ErrorResponse, HealthResponse, StatsResponse};
