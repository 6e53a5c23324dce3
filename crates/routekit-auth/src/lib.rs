//! # Routekit Auth
//!
//! Bearer-token protection for routekit servers.
//!
//! - [`claims`]: the JWT claim set carried by access tokens
//! - [`jwt`]: token issuance and verification (HS256 via `jsonwebtoken`)
//! - [`strategy`]: the [`JwtStrategy`] policy seam and its HMAC implementation
//! - [`pattern`]: wildcard protect expressions (`/api*`, `*`)
//! - [`guard`]: the initialisation and guard middlewares plus the
//!   [`AuthClaims`] extractor
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use routekit_auth::{HmacJwtStrategy, JwtStrategy, issue_token};
//! use routekit_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let token = issue_token("user-1", Default::default(), &config)?;
//!
//! let strategy: Arc<dyn JwtStrategy> = Arc::new(HmacJwtStrategy::new(config));
//! let claims = strategy.verify(&token)?;
//! assert_eq!(claims.sub, "user-1");
//! ```

pub mod claims;
pub mod guard;
pub mod jwt;
pub mod pattern;
pub mod strategy;

// Re-export commonly used types at crate root
pub use claims::Claims;
pub use guard::{AuthClaims, Authenticator, guard, initialize};
pub use jwt::{issue_token, verify_token};
pub use pattern::ProtectPattern;
pub use strategy::{HmacJwtStrategy, JwtStrategy};
