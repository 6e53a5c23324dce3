//! # routekit
//!
//! A fluent route and middleware composer on top of axum.
//!
//! ## Overview
//!
//! [`ApiServer`] wires together, in a fixed order:
//!
//! - **CORS** (`ALLOWED_ORIGINS`)
//! - **API documentation** published by a [`DocsModule`]
//! - **Security headers** (helmet's default set)
//! - **JSON body parsing** (`JSON_BODY_LIMIT`)
//! - **Access and error logs** written to rolling files
//!
//! and then lets callers register route installers, route groups, a JWT
//! protected area and extra middlewares. Registration order is execution
//! order: every middleware wraps all stages registered after it.
//!
//! ## Architecture
//!
//! ```text
//! crates/
//! ├── routekit-core/           # AppError, ConfigError, Middleware, status catalog
//! ├── routekit-config/         # env-backed config structs
//! ├── routekit-auth/           # JWT claims, strategy, protect pattern, guard
//! ├── routekit-cache/          # in-memory TTL response cache
//! └── routekit-observability/  # log streams, line formats, tracing setup
//! src/
//! ├── docs.rs                  # DocsModule, DocsPublisher
//! ├── installer.rs             # RouteInstaller
//! ├── middleware.rs            # cors, security_headers, json_body
//! └── server.rs                # ApiServer
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use axum::routing::get;
//! use routekit::{ApiOptions, ApiServer, RouteInstaller, StartCallback};
//! use routekit_config::ServerConfig;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let ping = RouteInstaller::new(|router, _| router.route("/ping", get(|| async { "pong" })))
//!     .named("ping");
//!
//! ApiServer::new(ApiOptions::default(), &ServerConfig::from_env())?
//!     .register_routes([ping])
//!     .start(StartCallback::sync(|addr| println!("listening on {addr}")), 0)
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`docs`]: documentation publishing
//! - [`installer`]: route installers
//! - [`middleware`]: baseline middlewares
//! - [`server`]: the composer

pub mod docs;
pub mod installer;
pub mod middleware;
pub mod server;

pub use docs::{DocsModule, DocsPublisher};
pub use installer::RouteInstaller;
pub use middleware::{JsonBody, cors, json_body, security_headers};
pub use server::{ApiOptions, ApiServer, Fallback, LogOption, ServeError, StartCallback};

// Re-export workspace crates for convenience
pub use routekit_auth;
pub use routekit_cache;
pub use routekit_config;
pub use routekit_core;
pub use routekit_observability;

pub use routekit_core::{AppError, ConfigError, HttpStatus, Middleware};
