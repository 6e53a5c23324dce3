//! Response cache configuration.

use std::env;
use std::time::Duration;

/// Default TTL used when a route is cached without an explicit duration.
///
/// # Environment Variables
///
/// - `REQUEST_CACHING`: TTL in seconds (default: `30`)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheConfig {
    pub default_ttl_seconds: u64,
}

impl CacheConfig {
    pub fn from_env() -> Self {
        Self {
            default_ttl_seconds: env::var("REQUEST_CACHING")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        }
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_seconds)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_seconds: 30,
        }
    }
}
