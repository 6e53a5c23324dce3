//! Signing settings for bearer tokens issued and verified by the built-in
//! HMAC strategy.
//!
//! # Environment Variables
//!
//! - `JWT_SECRET`: HS256 signing secret (default: a development-only value)
//! - `JWT_ACCESS_EXPIRY`: token lifetime in seconds; non-positive or
//!   unparsable values fall back to the default (default: `3600`)

use std::env;

const DEV_SECRET: &str = "routekit-dev-secret-change-in-production";
const DEFAULT_ACCESS_EXPIRY: i64 = 60 * 60;

#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    /// Seconds between `iat` and `exp` of an issued token.
    pub access_token_expiry: i64,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        Self {
            secret: env::var("JWT_SECRET").unwrap_or_else(|_| DEV_SECRET.to_string()),
            access_token_expiry: access_expiry(env::var("JWT_ACCESS_EXPIRY").ok().as_deref()),
        }
    }
}

fn access_expiry(value: Option<&str>) -> i64 {
    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(DEFAULT_ACCESS_EXPIRY)
}
