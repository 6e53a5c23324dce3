//! Per-request `tracing` events.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::{Next, from_fn},
    response::Response,
};
use tracing::{error, info, warn};

use routekit_core::Middleware;

/// Emits one event when a request arrives and one when it completes,
/// tagged with a generated request id. The completion level follows the
/// status class.
pub fn trace_requests() -> Middleware {
    Middleware::new("request-trace", from_fn(trace_request))
}

async fn trace_request(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let request_id = uuid::Uuid::new_v4().to_string();

    info!(request_id = %request_id, method = %method, path = %path, "Incoming request");

    let response = next.run(req).await;
    let latency_ms = start.elapsed().as_millis();
    let status = response.status().as_u16();

    match status {
        400..=499 => warn!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status,
            latency_ms = %latency_ms,
            "Client error"
        ),
        500..=599 => error!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status,
            latency_ms = %latency_ms,
            "Server error"
        ),
        _ => info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status,
            latency_ms = %latency_ms,
            "Request completed"
        ),
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::StatusCode, routing::get};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_passes_response_through() {
        let app = trace_requests().apply(
            Router::new()
                .route("/teapot", get(|| async { StatusCode::IM_A_TEAPOT }))
                .fallback(|| async { StatusCode::NOT_FOUND }),
        );
        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/teapot")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    }
}
