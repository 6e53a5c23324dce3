//! Type-erased middleware.
//!
//! [`Middleware`] wraps any tower layer that [`axum::Router::layer`] accepts,
//! together with a name for log output, so middlewares of different concrete
//! types can sit in one ordered list and be applied later.

use std::borrow::Cow;
use std::convert::Infallible;

use axum::{Router, extract::Request, response::IntoResponse, routing::Route};
use tower::{Layer, Service};

type ApplyFn = Box<dyn FnOnce(Router) -> Router + Send>;

pub struct Middleware {
    name: Cow<'static, str>,
    apply: ApplyFn,
}

impl Middleware {
    pub fn new<L>(name: impl Into<Cow<'static, str>>, layer: L) -> Self
    where
        L: Layer<Route> + Clone + Send + Sync + 'static,
        L::Service: Service<Request> + Clone + Send + Sync + 'static,
        <L::Service as Service<Request>>::Response: IntoResponse + 'static,
        <L::Service as Service<Request>>::Error: Into<Infallible> + 'static,
        <L::Service as Service<Request>>::Future: Send + 'static,
    {
        Self {
            name: name.into(),
            apply: Box::new(move |router: Router| router.layer(layer)),
        }
    }

    /// Builds a middleware from an arbitrary router transformation, for
    /// stacks of several layers that belong together.
    pub fn from_fn(
        name: impl Into<Cow<'static, str>>,
        apply: impl FnOnce(Router) -> Router + Send + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            apply: Box::new(apply),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wraps every route of `router`, including its fallback.
    pub fn apply(self, router: Router) -> Router {
        (self.apply)(router)
    }
}

impl std::fmt::Debug for Middleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Middleware")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{HeaderValue, Request as HttpRequest},
        routing::get,
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_apply_wraps_routes_and_fallback() {
        let tag = Middleware::new(
            "tag",
            axum::middleware::map_response(|mut res: axum::response::Response| async move {
                res.headers_mut()
                    .insert("x-tagged", HeaderValue::from_static("1"));
                res
            }),
        );
        assert_eq!(tag.name(), "tag");

        let router = tag.apply(
            Router::new()
                .route("/hit", get(|| async { "hit" }))
                .fallback(|| async { "fallback" }),
        );

        let routed = router
            .clone()
            .oneshot(HttpRequest::builder().uri("/hit").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(routed.headers().contains_key("x-tagged"));

        let missed = router
            .oneshot(HttpRequest::builder().uri("/miss").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(missed.headers().contains_key("x-tagged"));
    }
}
