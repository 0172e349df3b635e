//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the persistent icon store
    pub cache_dir: PathBuf,
    /// Default lifetime in seconds for freshly cached icons
    pub default_ttl: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Timeout in seconds for a single icon download
    pub fetch_timeout: u64,
    /// Largest response body accepted from an icon host
    pub max_download_bytes: usize,
    /// Edge length used when a request names no width or height
    pub default_icon_size: u32,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DIR` - Store directory (default: .icon-cache)
    /// - `DEFAULT_TTL` - Icon lifetime in seconds (default: 86400)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `FETCH_TIMEOUT` - Download timeout in seconds (default: 30)
    /// - `MAX_DOWNLOAD_BYTES` - Largest accepted body (default: 10 MiB)
    /// - `DEFAULT_ICON_SIZE` - Fallback edge length in pixels (default: 64)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cache_dir: env::var("CACHE_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_dir),
            default_ttl: env_or("DEFAULT_TTL", defaults.default_ttl),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            fetch_timeout: env_or("FETCH_TIMEOUT", defaults.fetch_timeout),
            max_download_bytes: env_or("MAX_DOWNLOAD_BYTES", defaults.max_download_bytes),
            default_icon_size: env_or("DEFAULT_ICON_SIZE", defaults.default_icon_size),
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(".icon-cache"),
            default_ttl: 86_400,
            server_port: 3000,
            fetch_timeout: 30,
            max_download_bytes: 10 * 1024 * 1024,
            default_icon_size: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.cache_dir, PathBuf::from(".icon-cache"));
        assert_eq!(config.default_ttl, 86_400);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.fetch_timeout, 30);
        assert_eq!(config.max_download_bytes, 10 * 1024 * 1024);
        assert_eq!(config.default_icon_size, 64);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("CACHE_DIR");
        env::remove_var("DEFAULT_TTL");
        env::remove_var("SERVER_PORT");
        env::remove_var("FETCH_TIMEOUT");
        env::remove_var("MAX_DOWNLOAD_BYTES");
        env::remove_var("DEFAULT_ICON_SIZE");

        let config = Config::from_env();
        assert_eq!(config.cache_dir, PathBuf::from(".icon-cache"));
        assert_eq!(config.default_ttl, 86_400);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.fetch_timeout, 30);
        assert_eq!(config.default_icon_size, 64);
    }

    #[test]
    fn test_env_or_ignores_unparsable_values() {
        env::set_var("ICON_CACHE_TEST_BOGUS_PORT", "not-a-port");
        let port: u16 = env_or("ICON_CACHE_TEST_BOGUS_PORT", 8080);
        assert_eq!(port, 8080);
        env::remove_var("ICON_CACHE_TEST_BOGUS_PORT");
    }
}
