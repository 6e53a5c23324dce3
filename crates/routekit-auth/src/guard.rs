//! Authentication middlewares and the claims extractor.
//!
//! Two steps, installed in this order by the server:
//!
//! 1. [`initialize`] puts the configured [`JwtStrategy`] into every request's
//!    extensions as an [`Authenticator`].
//! 2. [`guard`] rejects requests on protected paths that do not carry a valid
//!    `Authorization: Bearer <token>` header. Nothing is persisted between
//!    requests; verified claims live only in that request's extensions.
//!
//! Handlers read the verified claims with the [`AuthClaims`] extractor.

use std::sync::Arc;

use axum::{
    Extension,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use tracing::debug;

use routekit_core::AppError;

use crate::claims::Claims;
use crate::pattern::ProtectPattern;
use crate::strategy::JwtStrategy;

/// Handle to the verification strategy, carried in request extensions.
#[derive(Clone)]
pub struct Authenticator(pub Arc<dyn JwtStrategy>);

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Authenticator").field(&self.0.name()).finish()
    }
}

/// Layer that binds `strategy` to every request passing through it.
pub fn initialize(strategy: Arc<dyn JwtStrategy>) -> Extension<Authenticator> {
    Extension(Authenticator(strategy))
}

/// Bearer guard for paths matching the protect expression.
///
/// Use with `axum::middleware::from_fn_with_state(Arc<ProtectPattern>, guard)`.
pub async fn guard(
    State(pattern): State<Arc<ProtectPattern>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !pattern.matches(req.uri().path()) {
        return Ok(next.run(req).await);
    }

    let authenticator = req
        .extensions()
        .get::<Authenticator>()
        .cloned()
        .ok_or_else(|| AppError::internal(anyhow::anyhow!("authentication is not initialized")))?;

    let bearer = req
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or_else(|| {
            debug!(path = %req.uri().path(), "Rejected request without bearer token");
            AppError::unauthorized("Missing or malformed authorization header")
        })?;

    let claims = authenticator.0.verify(bearer.token())?;
    debug!(path = %req.uri().path(), sub = %claims.sub, "Bearer token accepted");

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Extractor for the claims verified by [`guard`].
#[derive(Debug, Clone)]
pub struct AuthClaims(pub Claims);

impl<S> FromRequestParts<S> for AuthClaims
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthClaims)
            .ok_or_else(|| AppError::unauthorized("Route is not protected by a bearer guard"))
    }
}
