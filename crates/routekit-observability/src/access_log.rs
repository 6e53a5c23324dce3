//! Access/error logging middleware.
//!
//! One middleware per [`LogStream`]. After the inner service answers, the
//! request is rendered with the configured [`LogFormat`] and appended to the
//! stream when its status falls in that stream's partition.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::HttpBody,
    extract::{ConnectInfo, OriginalUri, Request, State},
    http::{HeaderValue, Version, header::CONTENT_LENGTH},
    middleware::{Next, from_fn_with_state},
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Basic};
use chrono::Utc;
use tracing::warn;

use routekit_config::LogConfig;
use routekit_core::{ConfigError, Middleware};

use crate::format::{LogFormat, LogRecord};
use crate::stream::{LogKind, LogStream, get_file_stream};

#[derive(Clone)]
struct StreamLogger {
    stream: LogStream,
    format: Arc<LogFormat>,
}

/// Logs requests whose status belongs to `stream`'s kind.
pub fn access_log(stream: LogStream, format: Arc<LogFormat>) -> Middleware {
    let name = format!("{}-log", stream.kind());
    Middleware::new(name, from_fn_with_state(StreamLogger { stream, format }, write_entry))
}

/// Opens the access and error streams and returns their middlewares, in
/// that order.
pub fn access_and_error_logs(
    directory: Option<&Path>,
    config: &LogConfig,
) -> Result<[Middleware; 2], ConfigError> {
    let format = Arc::new(LogFormat::parse(&config.format)?);
    let access = get_file_stream(LogKind::Access, directory, config)?;
    let error = get_file_stream(LogKind::Error, directory, config)?;
    Ok([
        access_log(access, format.clone()),
        access_log(error, format),
    ])
}

fn http_version(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2.0",
        Version::HTTP_3 => "3.0",
        _ => "1.1",
    }
}

async fn write_entry(State(logger): State<StreamLogger>, req: Request, next: Next) -> Response {
    let start = Instant::now();
    let time = Utc::now();

    let remote_addr = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string());
    let remote_user = req
        .headers()
        .typed_get::<Authorization<Basic>>()
        .map(|auth| auth.username().to_string());
    let url = req
        .extensions()
        .get::<OriginalUri>()
        .map(|original| original.0.to_string())
        .unwrap_or_else(|| req.uri().to_string());
    let method = req.method().to_string();
    let version = http_version(req.version());
    let request_headers = req.headers().clone();

    let response = next.run(req).await;
    let status = response.status().as_u16();
    if !logger.stream.kind().records(status) {
        return response;
    }

    let mut response_headers = response.headers().clone();
    if !response_headers.contains_key(CONTENT_LENGTH) {
        if let Some(len) = response.body().size_hint().exact() {
            response_headers.insert(CONTENT_LENGTH, HeaderValue::from(len));
        }
    }

    let record = LogRecord {
        remote_addr,
        remote_user,
        time,
        method,
        url,
        http_version: version,
        status,
        request_headers,
        response_headers,
        response_time: start.elapsed(),
    };

    let line = logger.format.render(&record);
    if let Err(e) = logger.stream.write_line(&line) {
        warn!(log.kind = %logger.stream.kind(), error = %e, "Failed to write log line");
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::StatusCode, routing::get};
    use routekit_config::LogInterval;
    use std::fs;
    use tower::ServiceExt;

    fn log_config(dir: &Path, format: &str) -> LogConfig {
        LogConfig {
            format: format.to_string(),
            interval: LogInterval::Never,
            directory: dir.to_path_buf(),
            ..LogConfig::default()
        }
    }

    fn app(middlewares: [Middleware; 2]) -> Router {
        let router = Router::new()
            .route("/ok", get(|| async { "fine" }))
            .route(
                "/moved",
                get(|| async { (StatusCode::MOVED_PERMANENTLY, "moved") }),
            )
            .route("/boom", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
            .fallback(|| async { StatusCode::NOT_FOUND });
        let [access, error] = middlewares;
        error.apply(access.apply(router))
    }

    async fn hit(app: &Router, uri: &str) {
        app.clone()
            .oneshot(
                axum::http::Request::builder()
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_statuses_are_partitioned() {
        let dir = tempfile::tempdir().unwrap();
        let config = log_config(dir.path(), ":method :url :status");
        let app = app(access_and_error_logs(None, &config).unwrap());

        for uri in ["/ok", "/moved", "/boom", "/missing"] {
            hit(&app, uri).await;
        }

        let access = fs::read_to_string(dir.path().join("access-current.log")).unwrap();
        let error = fs::read_to_string(dir.path().join("error-current.log")).unwrap();
        assert_eq!(access, "GET /ok 200\nGET /moved 301\n");
        assert_eq!(error, "GET /moved 301\nGET /boom 500\nGET /missing 404\n");
    }

    #[tokio::test]
    async fn test_content_length_and_missing_peer() {
        let dir = tempfile::tempdir().unwrap();
        let config = log_config(dir.path(), "tiny");
        let app1 = app(access_and_error_logs(None, &config).unwrap());

        hit(&app1, "/ok").await;

        let access = fs::read_to_string(dir.path().join("access-current.log")).unwrap();
        assert!(access.starts_with("GET /ok 200 4 - "), "{}", access);

        let dir = tempfile::tempdir().unwrap();
        let config = log_config(dir.path(), ":remote-addr :status");
        let app2 = app(access_and_error_logs(None, &config).unwrap());
        hit(&app2, "/ok").await;
        let access = fs::read_to_string(dir.path().join("access-current.log")).unwrap();
        assert_eq!(access, "- 200\n");
    }

    #[test]
    fn test_bad_format_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = log_config(dir.path(), ":bogus");
        assert!(access_and_error_logs(None, &config).is_err());
    }
}
