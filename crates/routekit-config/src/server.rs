use std::env;

/// Listener and request-surface settings.
///
/// # Environment Variables
///
/// - `PORT`: listen port (default: `3000`)
/// - `API_BASE_PATH`: prefix for the documentation endpoints (default: empty)
/// - `JSON_BODY_LIMIT`: maximum JSON request body in bytes (default: `102400`)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub api_base_path: String,
    pub json_body_limit: usize,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3000),
            api_base_path: env::var("API_BASE_PATH")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or_default(),
            json_body_limit: env::var("JSON_BODY_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(100 * 1024),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            api_base_path: String::new(),
            json_body_limit: 100 * 1024,
        }
    }
}
