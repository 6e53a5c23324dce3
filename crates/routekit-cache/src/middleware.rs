//! Response cache middleware.
//!
//! For each request the cache key is `"__routekit__"` followed by the
//! original request URI (path and query). A live entry is replayed as-is,
//! without running the handler. Otherwise the handler runs and, if it
//! answered with JSON, the body is stored for the TTL and sent with the
//! configured success status.

use std::time::Duration;

use axum::{
    body::Body,
    extract::{OriginalUri, Request, State},
    http::{StatusCode, header::CONTENT_TYPE},
    middleware::{Next, from_fn_with_state},
    response::{IntoResponse, Response},
};
use http_body_util::BodyExt;
use tracing::{debug, warn};

use routekit_config::CacheConfig;
use routekit_core::Middleware;

use crate::store::{CachedResponse, ResponseCache};

const KEY_PREFIX: &str = "__routekit__";

#[derive(Clone)]
struct CacheRoute {
    store: ResponseCache,
    ttl: Duration,
    success_status: StatusCode,
}

/// Caches JSON responses in the process-wide store for `duration_seconds`.
pub fn cache(duration_seconds: u64, success_status: StatusCode) -> Middleware {
    cache_for(Duration::from_secs(duration_seconds), success_status)
}

/// Same as [`cache`] with an arbitrary TTL.
pub fn cache_for(ttl: Duration, success_status: StatusCode) -> Middleware {
    ResponseCache::global().layer(ttl, success_status)
}

/// Caches with the `REQUEST_CACHING` TTL and a `200 OK` success status.
pub fn cache_default(config: &CacheConfig) -> Middleware {
    cache_for(config.default_ttl(), StatusCode::OK)
}

impl ResponseCache {
    /// Middleware filling and replaying this particular store. Also starts
    /// the store's background sweeper when called inside a tokio runtime.
    pub fn layer(&self, ttl: Duration, success_status: StatusCode) -> Middleware {
        self.spawn_sweeper(ttl);
        let route = CacheRoute {
            store: self.clone(),
            ttl,
            success_status,
        };
        Middleware::new(
            format!("cache({}ms)", ttl.as_millis()),
            from_fn_with_state(route, replay_or_fill),
        )
    }
}

fn cache_key(req: &Request) -> String {
    let uri = req
        .extensions()
        .get::<OriginalUri>()
        .map(|original| original.0.to_string())
        .unwrap_or_else(|| req.uri().to_string());
    format!("{}{}", KEY_PREFIX, uri)
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

async fn replay_or_fill(State(route): State<CacheRoute>, req: Request, next: Next) -> Response {
    let key = cache_key(&req);

    if let Some(hit) = route.store.get(&key) {
        debug!(cache.key = %key, "Cache hit");
        return hit.into_response();
    }

    let response = next.run(req).await;
    if !is_json(&response) {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!(cache.key = %key, error = %e, "Failed to buffer response for caching");
            return (parts, Body::empty()).into_response();
        }
    };

    parts.status = route.success_status;
    route.store.put(
        key,
        CachedResponse {
            status: route.success_status,
            content_type: parts.headers.get(CONTENT_TYPE).cloned(),
            body: bytes.clone(),
        },
        route.ttl,
    );

    Response::from_parts(parts, Body::from(bytes))
}
