//! Icon Cache - A persistent, time-expiring image fetch-and-transform cache
//!
//! Given a remote image URL and a desired pixel size, returns a decoded,
//! correctly sized bitmap, downloading and rasterizing the source only when no
//! fresh cached copy exists. Failures never reach the caller: they resolve to a
//! procedurally drawn error icon.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod fallback;
pub mod fetch;
pub mod imaging;
pub mod models;
pub mod service;

pub use api::AppState;
pub use config::Config;
pub use error::{IconError, Result};
pub use imaging::{DecodedImage, DesiredSize};
pub use service::{IconOutcome, IconService, IconSource};
