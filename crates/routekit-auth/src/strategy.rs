//! Verification policy supplied by the caller.

use routekit_config::JwtConfig;
use routekit_core::AppError;

use crate::claims::Claims;
use crate::jwt::verify_token;

/// Decides whether a bearer token is acceptable.
///
/// The server never builds a strategy itself; callers hand one to
/// `ApiOptions` and it is installed ahead of the guard.
pub trait JwtStrategy: Send + Sync + 'static {
    /// Name used in log output.
    fn name(&self) -> &str {
        "jwt"
    }

    fn verify(&self, token: &str) -> Result<Claims, AppError>;
}

/// HS256 strategy backed by a shared secret.
#[derive(Clone, Debug)]
pub struct HmacJwtStrategy {
    config: JwtConfig,
}

impl HmacJwtStrategy {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }
}

impl JwtStrategy for HmacJwtStrategy {
    fn verify(&self, token: &str) -> Result<Claims, AppError> {
        verify_token(token, &self.config)
    }
}
