//! API Module
//!
//! HTTP handlers and routing for the icon service REST API.
//!
//! # Endpoints
//! - `GET /icon?url=&width=&height=&ttl=` - Icon as PNG
//! - `GET /icon/empty` - Empty-state icon as PNG
//! - `GET /icon/error` - Error icon as PNG
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
