//! The route and middleware composer.
//!
//! [`ApiServer`] records middlewares and route blocks in registration order
//! and turns them into one [`Router`] when it is started. Each middleware
//! wraps everything registered after it; a request answered by an earlier
//! route block never reaches the stages that follow it.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;

use axum::{
    Router,
    extract::Request,
    handler::Handler,
    http::{Method, Uri},
    middleware::from_fn_with_state,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tower::ServiceExt;
use tracing::info;

use routekit_auth::{JwtStrategy, ProtectPattern, guard, initialize};
use routekit_config::{CorsConfig, LogConfig, ServerConfig};
use routekit_core::{AppError, ConfigError, Middleware};
use routekit_observability::access_and_error_logs;

use crate::docs::DocsModule;
use crate::installer::RouteInstaller;
use crate::middleware::{cors, json_body, security_headers};

/// Where access/error logs go, if anywhere.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LogOption {
    #[default]
    Disabled,
    /// `LOG_FOLDER`, else `<cwd>/logs`.
    Default,
    Directory(std::path::PathBuf),
}

impl From<bool> for LogOption {
    fn from(enabled: bool) -> Self {
        if enabled { Self::Default } else { Self::Disabled }
    }
}

/// Handler for requests that no route matched.
pub struct Fallback {
    install: Box<dyn FnOnce(Router) -> Router + Send>,
}

impl Fallback {
    pub fn new<H, T>(handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        Self {
            install: Box::new(move |router: Router| router.fallback(handler)),
        }
    }
}

impl std::fmt::Debug for Fallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fallback").finish_non_exhaustive()
    }
}

#[derive(Default)]
pub struct ApiOptions {
    pub enable_cors: bool,
    pub cors: CorsConfig,
    pub fallback: Option<Fallback>,
    pub docs: Option<Box<dyn DocsModule>>,
    pub logging: LogOption,
    pub log_config: LogConfig,
    pub jwt_strategy: Option<Arc<dyn JwtStrategy>>,
}

type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Code run once the listener is bound, with the bound address.
#[derive(Default)]
pub enum StartCallback {
    #[default]
    None,
    Sync(Box<dyn FnOnce(SocketAddr) + Send>),
    Async(Box<dyn FnOnce(SocketAddr) -> BoxFuture + Send>),
}

impl StartCallback {
    pub fn sync(callback: impl FnOnce(SocketAddr) + Send + 'static) -> Self {
        Self::Sync(Box::new(callback))
    }

    pub fn future<F, Fut>(callback: F) -> Self
    where
        F: FnOnce(SocketAddr) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::Async(Box::new(move |addr| Box::pin(callback(addr))))
    }

    async fn run(self, addr: SocketAddr) {
        match self {
            Self::None => {}
            Self::Sync(callback) => callback(addr),
            Self::Async(callback) => callback(addr).await,
        }
    }
}

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("failed to bind port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] io::Error),
}

enum Stage {
    Middleware(Middleware),
    Routes(Router),
}

pub struct ApiServer {
    port: u16,
    router: Router,
    groups: Vec<(String, Router)>,
    fallback: Option<Fallback>,
    jwt_strategy: Option<Arc<dyn JwtStrategy>>,
    stages: Vec<Stage>,
}

impl ApiServer {
    pub fn new(options: ApiOptions, config: &ServerConfig) -> Result<Self, ConfigError> {
        let ApiOptions {
            enable_cors,
            cors: cors_config,
            fallback,
            docs,
            logging,
            log_config,
            jwt_strategy,
        } = options;

        let mut server = Self {
            port: config.port,
            router: Router::new(),
            groups: Vec::new(),
            fallback,
            jwt_strategy,
            stages: Vec::new(),
        };

        if enable_cors {
            info!(origins = ?cors_config.allowed_origins, "Enabling CORS");
            server.push_middleware(cors(&cors_config));
        }

        if let Some(docs) = docs {
            info!("Publishing API documentation");
            server.stages.push(Stage::Routes(docs.publish(Router::new())));
        }

        info!("Enabling security headers");
        server.push_middleware(security_headers());

        info!(limit = config.json_body_limit, "Enabling JSON body parsing");
        server.push_middleware(json_body(config.json_body_limit));

        let directory = match &logging {
            LogOption::Disabled => None,
            LogOption::Default => Some(None),
            LogOption::Directory(path) => Some(Some(path.as_path())),
        };
        if let Some(directory) = directory {
            let [access, error] = access_and_error_logs(directory, &log_config)?;
            info!(
                directory = %directory.unwrap_or(log_config.directory.as_path()).display(),
                format = %log_config.format,
                "Enabling access and error logs"
            );
            server.push_middleware(access);
            server.push_middleware(error);
        }

        Ok(server)
    }

    fn push_middleware(&mut self, middleware: Middleware) {
        self.stages.push(Stage::Middleware(middleware));
    }

    /// Adds routes to the default router, mounted at the root on start.
    pub fn register_routes(mut self, installers: impl IntoIterator<Item = RouteInstaller>) -> Self {
        for installer in installers {
            info!(route = installer.name(), "Registering routes");
            self.router = installer.install(self.router);
        }
        self
    }

    /// Builds a router from `installers` and mounts it under `base_path` on
    /// start. Registering the same base path again replaces the earlier
    /// router but keeps its position.
    pub fn register_routes_group(
        mut self,
        base_path: impl Into<String>,
        installers: impl IntoIterator<Item = RouteInstaller>,
    ) -> Self {
        let base_path = base_path.into();
        info!(base_path = %base_path, "Registering route group");

        let mut router = Router::new();
        for installer in installers {
            info!(route = installer.name(), base_path = %base_path, "Registering routes");
            router = installer.install(router);
        }
        match self.groups.iter_mut().find(|(path, _)| *path == base_path) {
            Some((_, existing)) => *existing = router,
            None => self.groups.push((base_path, router)),
        }
        self
    }

    /// Installs authentication: strategy initialisation, then the routes
    /// added by `installer` (reachable without a token), then a bearer guard
    /// over paths matching `protect_expression`.
    pub fn register_authentication_route<F>(
        mut self,
        base_path: &str,
        installer: F,
        protect_expression: &str,
    ) -> Result<Self, ConfigError>
    where
        F: FnOnce(&str, Router) -> Router,
    {
        let strategy = self
            .jwt_strategy
            .clone()
            .ok_or(ConfigError::MissingJwtStrategy)?;

        info!(strategy = strategy.name(), base_path = %base_path, "Registering authentication routes");
        self.push_middleware(Middleware::new("auth-initialize", initialize(strategy)));
        self.stages
            .push(Stage::Routes(installer(base_path, Router::new())));

        let pattern = Arc::new(ProtectPattern::new(protect_expression));
        info!(protect = pattern.as_str(), "Protecting routes");
        self.push_middleware(Middleware::new(
            format!("auth-guard({})", pattern.as_str()),
            from_fn_with_state(pattern, guard),
        ));

        Ok(self)
    }

    pub fn register_middlewares(mut self, middlewares: impl IntoIterator<Item = Middleware>) -> Self {
        for middleware in middlewares {
            info!(middleware = middleware.name(), "Registering middleware");
            self.push_middleware(middleware);
        }
        self
    }

    /// Mounts the default router, the groups and the fallback, then folds
    /// every stage into a single router.
    pub fn into_router(self) -> Router {
        let Self {
            router,
            groups,
            fallback,
            mut stages,
            ..
        } = self;

        info!("Mounting default routes");
        stages.push(Stage::Routes(router));
        for (base_path, group) in groups {
            info!(base_path = %base_path, "Mounting route group");
            let path = base_path.trim_matches('/');
            let mounted = if path.is_empty() {
                group
            } else {
                Router::new().nest(&format!("/{}", path), group)
            };
            stages.push(Stage::Routes(mounted));
        }

        let terminal = match fallback {
            Some(fallback) => (fallback.install)(Router::new()),
            None => Router::new().fallback(not_found),
        };

        stages
            .into_iter()
            .rev()
            .fold(terminal, |rest, stage| match stage {
                Stage::Middleware(middleware) => middleware.apply(rest),
                Stage::Routes(routes) => chain(routes, rest),
            })
    }

    /// Binds `0.0.0.0:{port}` and serves until the server stops. A `port`
    /// of 0 keeps the configured port.
    pub async fn start(mut self, callback: StartCallback, port: u16) -> Result<(), ServeError> {
        if port != 0 {
            self.port = port;
        }
        let port = self.port;

        let listener = TcpListener::bind(("0.0.0.0", port))
            .await
            .map_err(|source| ServeError::Bind { port, source })?;

        self.serve_on(listener, callback).await
    }

    /// Serves on an already bound listener.
    pub async fn serve_on(self, listener: TcpListener, callback: StartCallback) -> Result<(), ServeError> {
        let addr = listener.local_addr()?;
        let app = self.into_router();

        let server = tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
        });
        info!(%addr, "Server listening");

        callback.run(addr).await;

        server.await.map_err(io::Error::other)??;
        Ok(())
    }
}

/// Puts `routes` in front of `rest`. Requests for unknown paths, and for
/// known paths with a method `routes` does not handle, continue into `rest`.
fn chain(routes: Router, rest: Router) -> Router {
    let forward = rest.clone();
    routes
        .method_not_allowed_fallback(move |request: Request| {
            let rest = forward.clone();
            async move {
                match rest.oneshot(request).await {
                    Ok(response) => response,
                    Err(never) => match never {},
                }
            }
        })
        .fallback_service(rest)
}

async fn not_found(method: Method, uri: Uri) -> AppError {
    AppError::not_found(anyhow::anyhow!("Cannot {} {}", method, uri.path()))
}
