mod common;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use common::{get_request, get_with_token, post_json, send, server_config, test_jwt_config, test_strategy};
use routekit::routekit_auth::{AuthClaims, issue_token};
use routekit::{ApiOptions, ApiServer, ConfigError, RouteInstaller};
use serde_json::{Map, Value, json};

fn login_installer(base_path: &str, router: Router) -> Router {
    router.route(
        &format!("{}/login", base_path),
        post(|| async {
            let token = issue_token("user-1", Map::new(), &test_jwt_config()).unwrap();
            axum::Json(json!({ "token": token }))
        }),
    )
}

fn protected_routes() -> RouteInstaller {
    RouteInstaller::new(|router, _| {
        router
            .route("/me", get(|AuthClaims(claims): AuthClaims| async move { claims.sub }))
            .route("/open", get(|| async { "open" }))
    })
}

fn secured_app() -> Router {
    let options = ApiOptions {
        jwt_strategy: Some(test_strategy()),
        ..ApiOptions::default()
    };
    ApiServer::new(options, &server_config())
        .unwrap()
        .register_authentication_route("/api/auth", login_installer, "/api")
        .unwrap()
        .register_routes_group("/api", [protected_routes()])
        .register_routes([RouteInstaller::new(|router, _| {
            router.route("/ping", get(|| async { "pong" }))
        })])
        .into_router()
}

#[test]
fn test_missing_strategy_is_a_config_error() {
    let server = ApiServer::new(ApiOptions::default(), &server_config()).unwrap();
    let result = server.register_authentication_route("/auth", login_installer, "*");
    assert!(matches!(result, Err(ConfigError::MissingJwtStrategy)));
}

#[tokio::test]
async fn test_protected_route_without_token_is_unauthorized() {
    let (status, body) = send(&secured_app(), get_request("/api/me")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let value: Value = serde_json::from_str(&body).unwrap();
    assert!(value["error"].is_string());
}

#[tokio::test]
async fn test_protected_route_with_garbage_token_is_unauthorized() {
    let (status, _) = send(&secured_app(), get_with_token("/api/open", "garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_is_reachable_without_token() {
    // the login route matches the protect expression but sits ahead of the guard
    let (status, body) = send(&secured_app(), post_json("/api/auth/login", "{}")).await;

    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_str(&body).unwrap();
    assert!(value["token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn test_issued_token_passes_the_guard() {
    let app = secured_app();
    let (_, body) = send(&app, post_json("/api/auth/login", "{}")).await;
    let value: Value = serde_json::from_str(&body).unwrap();
    let token = value["token"].as_str().unwrap();

    let (status, sub) = send(&app, get_with_token("/api/me", token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sub, "user-1");
}

#[tokio::test]
async fn test_unprotected_paths_need_no_token() {
    let (status, body) = send(&secured_app(), get_request("/ping")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "pong");
}

#[tokio::test]
async fn test_wildcard_protects_everything_after_the_guard() {
    let options = ApiOptions {
        jwt_strategy: Some(test_strategy()),
        ..ApiOptions::default()
    };
    let app = ApiServer::new(options, &server_config())
        .unwrap()
        .register_authentication_route("/auth", login_installer, "*")
        .unwrap()
        .register_routes([RouteInstaller::new(|router, _| {
            router.route("/ping", get(|| async { "pong" }))
        })])
        .into_router();

    assert_eq!(send(&app, get_request("/ping")).await.0, StatusCode::UNAUTHORIZED);
    assert_eq!(
        send(&app, post_json("/auth/login", "{}")).await.0,
        StatusCode::OK
    );
}
