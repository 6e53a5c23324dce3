//! # Routekit Core
//!
//! Foundational types shared by every routekit crate:
//!
//! - [`errors`]: request-time [`AppError`] and setup-time [`ConfigError`]
//! - [`middleware`]: the type-erased [`Middleware`] every crate hands to the server
//! - [`status`]: the HTTP status catalog (symbolic name <-> numeric code)
//!
//! # Example
//!
//! ```ignore
//! use routekit_core::{AppError, status};
//!
//! let err = AppError::unauthorized("Missing bearer token");
//! assert_eq!(status::code_for("UNAUTHORIZED"), Some(401));
//! ```

pub mod errors;
pub mod middleware;
pub mod status;

pub use errors::{AppError, ConfigError};
pub use middleware::Middleware;
pub use status::HttpStatus;
