mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::Json;
use axum::http::StatusCode;
use axum::routing::get;
use common::{get_request, send, server_config};
use routekit::routekit_cache::ResponseCache;
use routekit::{ApiOptions, ApiServer, RouteInstaller};
use serde_json::json;

#[tokio::test]
async fn test_cache_middleware_registered_on_the_server() {
    let store = ResponseCache::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let handler_calls = calls.clone();
    let app = ApiServer::new(ApiOptions::default(), &server_config())
        .unwrap()
        .register_middlewares([store.layer(Duration::from_secs(60), StatusCode::OK)])
        .register_routes([RouteInstaller::new(move |router, _| {
            let calls = handler_calls.clone();
            router.route(
                "/report",
                get(move || {
                    let calls = calls.clone();
                    async move { Json(json!({ "n": calls.fetch_add(1, Ordering::SeqCst) + 1 })) }
                }),
            )
        })])
        .into_router();

    let first = send(&app, get_request("/report?week=1")).await;
    let second = send(&app, get_request("/report?week=1")).await;
    assert_eq!(first, second);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(store.get("__routekit__/report?week=1").is_some());

    send(&app, get_request("/report?week=2")).await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
