use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use http_body_util::BodyExt;
use routekit::routekit_auth::{HmacJwtStrategy, JwtStrategy};
use routekit::routekit_config::{JwtConfig, ServerConfig};
use routekit::{ApiServer, StartCallback};
use tokio::net::TcpListener;
use tower::ServiceExt;

#[allow(dead_code)]
pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test-secret-key-at-least-32-characters-long".to_string(),
        access_token_expiry: 3600,
    }
}

#[allow(dead_code)]
pub fn test_strategy() -> Arc<dyn JwtStrategy> {
    Arc::new(HmacJwtStrategy::new(test_jwt_config()))
}

#[allow(dead_code)]
pub fn server_config() -> ServerConfig {
    ServerConfig::default()
}

#[allow(dead_code)]
pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[allow(dead_code)]
pub fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

#[allow(dead_code)]
pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Sends one request through the router and returns status and body text.
#[allow(dead_code)]
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, body_string(response).await)
}

#[allow(dead_code)]
pub async fn body_string(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Serves `server` on an ephemeral local port and returns the bound address
/// once the listener is up.
#[allow(dead_code)]
pub async fn spawn_server(server: ApiServer) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel();

    tokio::spawn(server.serve_on(
        listener,
        StartCallback::sync(move |addr| {
            let _ = tx.send(addr);
        }),
    ));

    rx.await.unwrap()
}
