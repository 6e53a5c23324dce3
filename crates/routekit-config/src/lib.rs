//! # Routekit Config
//!
//! Configuration types for routekit, each loaded once from the environment at
//! process entry and passed down explicitly:
//!
//! - [`server`]: listen port, docs base path, JSON body limit
//! - [`log`]: access/error log format, directory and rotation policy
//! - [`cache`]: default response-cache TTL
//! - [`cors`]: allowed CORS origins
//! - [`jwt`]: HMAC secret and token lifetime
//!
//! # Example
//!
//! ```ignore
//! use routekit_config::{CacheConfig, LogConfig, ServerConfig};
//!
//! let server = ServerConfig::from_env();
//! let log = LogConfig::from_env()?;
//! let cache = CacheConfig::from_env();
//! ```

pub mod cache;
pub mod cors;
pub mod jwt;
pub mod log;
pub mod server;

// Re-export commonly used types at crate root
pub use cache::CacheConfig;
pub use cors::CorsConfig;
pub use jwt::JwtConfig;
pub use log::{LogConfig, LogInterval};
pub use server::ServerConfig;
