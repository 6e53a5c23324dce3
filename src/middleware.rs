//! Baseline middlewares installed by [`crate::ApiServer`]: CORS, security
//! headers and JSON body parsing.

use axum::{
    body::{Body, to_bytes},
    extract::{FromRequestParts, Request, State},
    http::{
        HeaderName, HeaderValue, Method,
        header::{CONTENT_LENGTH, CONTENT_TYPE},
        request::Parts,
    },
    middleware::{Next, from_fn_with_state},
    response::Response,
};
use http_body_util::LengthLimitError;
use serde_json::Value;
use tower_http::{
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
};
use tracing::debug;

use routekit_config::CorsConfig;
use routekit_core::{AppError, Middleware};

/// CORS for the configured origins; `*` allows any origin.
pub fn cors(config: &CorsConfig) -> Middleware {
    let layer = CorsLayer::new().allow_methods([
        Method::GET,
        Method::HEAD,
        Method::PUT,
        Method::PATCH,
        Method::POST,
        Method::DELETE,
    ]);

    let layer = if config.allows_any_origin() {
        layer.allow_origin(Any).allow_headers(Any)
    } else {
        let allowed_origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        layer.allow_origin(allowed_origins).allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
    };

    Middleware::new("cors", layer)
}

const SECURITY_HEADERS: &[(&str, &str)] = &[
    (
        "content-security-policy",
        "default-src 'self';base-uri 'self';font-src 'self' https: data:;form-action 'self';\
         frame-ancestors 'self';img-src 'self' data:;object-src 'none';script-src 'self';\
         script-src-attr 'none';style-src 'self' https: 'unsafe-inline';upgrade-insecure-requests",
    ),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    ("origin-agent-cluster", "?1"),
    ("referrer-policy", "no-referrer"),
    ("strict-transport-security", "max-age=15552000; includeSubDomains"),
    ("x-content-type-options", "nosniff"),
    ("x-dns-prefetch-control", "off"),
    ("x-download-options", "noopen"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-permitted-cross-domain-policies", "none"),
    ("x-xss-protection", "0"),
];

/// Baseline security response headers. A header already set by the handler
/// is left alone.
pub fn security_headers() -> Middleware {
    Middleware::from_fn("security-headers", |router| {
        SECURITY_HEADERS.iter().fold(router, |router, &(name, value)| {
            router.layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            ))
        })
    })
}

/// Parsed JSON request body.
///
/// Available to handlers behind [`json_body`] when the request declared
/// `application/json` and carried a body.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonBody(pub Value);

impl<S> FromRequestParts<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<JsonBody>()
            .cloned()
            .ok_or_else(|| AppError::bad_request(anyhow::anyhow!("Expected a JSON request body")))
    }
}

/// Buffers and parses `application/json` bodies of at most `limit` bytes.
///
/// The original bytes are put back on the request, so `axum::Json` keeps
/// working downstream.
pub fn json_body(limit: usize) -> Middleware {
    Middleware::new(
        format!("json-body({})", limit),
        from_fn_with_state(limit, parse_json_body),
    )
}

fn declares_json(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| {
            let essence = v.split(';').next().unwrap_or("").trim();
            essence.eq_ignore_ascii_case("application/json")
                || essence.to_ascii_lowercase().ends_with("+json")
        })
}

async fn parse_json_body(
    State(limit): State<usize>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !declares_json(&req) {
        return Ok(next.run(req).await);
    }

    let declared_len = req
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared_len.is_some_and(|len| len > limit) {
        return Err(AppError::payload_too_large(anyhow::anyhow!(
            "Request body exceeds {} bytes",
            limit
        )));
    }

    let (mut parts, body) = req.into_parts();
    let bytes = to_bytes(body, limit).await.map_err(|e| {
        if is_length_limit(&e) {
            AppError::payload_too_large(anyhow::anyhow!("Request body exceeds {} bytes", limit))
        } else {
            AppError::bad_request(e)
        }
    })?;

    if !bytes.is_empty() {
        let value: Value = serde_json::from_slice(&bytes).map_err(|e| {
            debug!(error = %e, "Rejected malformed JSON body");
            AppError::bad_request(anyhow::anyhow!("Malformed JSON body: {}", e))
        })?;
        parts.extensions.insert(JsonBody(value));
    }

    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}

fn is_length_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}
