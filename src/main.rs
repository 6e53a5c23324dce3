use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use clap::Parser;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::info;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

use routekit::routekit_auth::{AuthClaims, HmacJwtStrategy, JwtStrategy, issue_token};
use routekit::routekit_cache::cache_default;
use routekit::routekit_config::{CacheConfig, CorsConfig, JwtConfig, LogConfig, ServerConfig};
use routekit::routekit_observability::{init_basic_console_logging, trace_requests};
use routekit::{
    ApiOptions, ApiServer, AppError, DocsPublisher, HttpStatus, LogOption, RouteInstaller,
    StartCallback,
};

#[derive(Parser, Debug)]
#[command(name = "routekit")]
#[command(about = "Demo server assembled with the routekit composer", long_about = None)]
struct Cli {
    /// Port to listen on; overrides PORT
    #[arg(short, long, default_value_t = 0)]
    port: u16,

    /// Enable CORS for ALLOWED_ORIGINS
    #[arg(long)]
    cors: bool,

    /// Write access/error logs (to LOG_FOLDER unless --log-dir is given)
    #[arg(long)]
    logs: bool,

    /// Directory for access/error logs
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

#[derive(Deserialize, ToSchema)]
struct LoginRequest {
    username: String,
}

#[derive(Serialize, ToSchema)]
struct TokenResponse {
    access_token: String,
    token_type: String,
}

#[derive(Serialize, ToSchema)]
struct StatusResponse {
    code: u16,
    name: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(ping, login, me, status_name, server_time),
    components(schemas(LoginRequest, TokenResponse, StatusResponse)),
    modifiers(&SecurityAddon),
    tags(
        (name = "Demo", description = "Demo endpoints"),
        (name = "Authentication", description = "Token issuance")
    ),
    info(
        title = "routekit demo",
        version = "0.1.0",
        description = "Routes registered through the routekit composer.",
        license(name = "MIT")
    )
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[utoipa::path(get, path = "/ping", tag = "Demo", responses((status = 200, description = "Liveness", body = String)))]
async fn ping() -> &'static str {
    "pong"
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Missing username")
    )
)]
async fn login(
    State(jwt_config): State<Arc<JwtConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    if request.username.is_empty() {
        return Err(AppError::bad_request(anyhow::anyhow!("username is required")));
    }

    let mut extra = Map::new();
    extra.insert("role".to_string(), json!("demo"));
    let access_token = issue_token(&request.username, extra, &jwt_config)?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/me",
    tag = "Demo",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Verified claims"),
        (status = 401, description = "Missing or invalid token")
    )
)]
async fn me(AuthClaims(claims): AuthClaims) -> Json<Value> {
    Json(json!(claims))
}

#[utoipa::path(
    get,
    path = "/api/status/{code}",
    tag = "Demo",
    security(("bearer_auth" = [])),
    params(("code" = u16, Path, description = "HTTP status code")),
    responses(
        (status = 200, description = "Symbolic name", body = StatusResponse),
        (status = 404, description = "Unknown code")
    )
)]
async fn status_name(Path(code): Path<u16>) -> Result<Json<StatusResponse>, AppError> {
    let status = HttpStatus::from_code(code)
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Unknown status code {}", code)))?;
    Ok(Json(StatusResponse {
        code: status.code,
        name: status.name.to_string(),
    }))
}

#[utoipa::path(get, path = "/cached/time", tag = "Demo", responses((status = 200, description = "Cached server time")))]
async fn server_time() -> Json<Value> {
    Json(json!({ "now": unix_now() }))
}

fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_basic_console_logging();

    let cli = Cli::parse();

    let server_config = ServerConfig::from_env();
    let log_config = LogConfig::from_env().context("invalid log configuration")?;
    let cache_config = CacheConfig::from_env();
    let jwt_config = Arc::new(JwtConfig::from_env());
    let strategy: Arc<dyn JwtStrategy> = Arc::new(HmacJwtStrategy::new((*jwt_config).clone()));

    let logging = match (cli.log_dir, cli.logs) {
        (Some(dir), _) => LogOption::Directory(dir),
        (None, enabled) => LogOption::from(enabled),
    };

    let options = ApiOptions {
        enable_cors: cli.cors,
        cors: CorsConfig::from_env(),
        docs: Some(Box::new(DocsPublisher::new(
            ApiDoc::openapi(),
            server_config.api_base_path.clone(),
        ))),
        logging,
        log_config,
        jwt_strategy: Some(strategy),
        ..ApiOptions::default()
    };

    let ping_routes = RouteInstaller::new(|router, _| router.route("/ping", get(ping))).named("ping");
    let api_routes = RouteInstaller::new(|router, _| {
        router
            .route("/me", get(me))
            .route("/status/{code}", get(status_name))
    })
    .named("api");
    let cached_routes = RouteInstaller::new(move |router, _| {
        cache_default(&cache_config).apply(router.route("/time", get(server_time)))
    })
    .named("cached");

    ApiServer::new(options, &server_config)?
        .register_middlewares([trace_requests()])
        .register_authentication_route(
            "/auth",
            move |base_path, router: Router| {
                router.route(
                    &format!("{}/login", base_path),
                    post(login).with_state(jwt_config),
                )
            },
            "/api",
        )?
        .register_routes([ping_routes])
        .register_routes_group("/api", [api_routes])
        .register_routes_group("/cached", [cached_routes])
        .start(
            StartCallback::sync(|addr| info!(%addr, "routekit demo is up")),
            cli.port,
        )
        .await?;

    Ok(())
}
