//! Route installers.
//!
//! An installer is a function that receives a router plus a free-form
//! argument bag and returns the router with its routes added.

use std::borrow::Cow;
use std::sync::Arc;

use axum::Router;
use serde_json::Value;

type InstallFn = Arc<dyn Fn(Router, &Value) -> Router + Send + Sync>;

/// A route-registration function with its arguments and an optional name
/// used in log output.
#[derive(Clone)]
pub struct RouteInstaller {
    func: InstallFn,
    args: Value,
    name: Option<Cow<'static, str>>,
}

impl RouteInstaller {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(Router, &Value) -> Router + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
            args: Value::Null,
            name: None,
        }
    }

    pub fn with_args(mut self, args: Value) -> Self {
        self.args = args;
        self
    }

    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The configured name, or `"RouteName"`.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("RouteName")
    }

    pub fn args(&self) -> &Value {
        &self.args
    }

    pub fn install(&self, router: Router) -> Router {
        (self.func)(router, &self.args)
    }
}

impl std::fmt::Debug for RouteInstaller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteInstaller")
            .field("name", &self.name())
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;
    use serde_json::json;

    #[test]
    fn test_default_name_and_args() {
        let installer = RouteInstaller::new(|router, _| router);
        assert_eq!(installer.name(), "RouteName");
        assert_eq!(installer.args(), &Value::Null);

        let named = installer.named("users").with_args(json!({ "prefix": "/u" }));
        assert_eq!(named.name(), "users");
        assert_eq!(named.args()["prefix"], "/u");
    }

    #[test]
    fn test_install_receives_args() {
        let installer = RouteInstaller::new(|router, args| {
            let path = args["path"].as_str().unwrap_or("/").to_string();
            router.route(&path, get(|| async { "ok" }))
        })
        .with_args(json!({ "path": "/hello" }));

        let _router: Router = installer.install(Router::new());
    }
}
