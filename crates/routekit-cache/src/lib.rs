//! # Routekit Cache
//!
//! Replays JSON responses from an in-memory store for a fixed TTL.
//!
//! - [`store`]: the process-wide [`ResponseCache`] key/value store
//! - [`middleware`]: the [`cache`] middleware that fills and replays it
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, http::StatusCode, routing::get};
//! use routekit_cache::cache;
//!
//! // cache GET /stats for 30 seconds
//! let stats = cache(30, StatusCode::OK).apply(Router::new().route("/stats", get(stats)));
//! ```

pub mod middleware;
pub mod store;

pub use middleware::{cache, cache_default, cache_for};
pub use store::{CachedResponse, ResponseCache};
