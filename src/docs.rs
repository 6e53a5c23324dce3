//! API documentation publishing.
//!
//! A [`DocsModule`] registers its own endpoints on the router it is handed.
//! [`ApiServer`](crate::ApiServer) invokes it at construction time, so its
//! routes sit ahead of the security-header and body-parsing middlewares.

use axum::{Json, Router, routing::get};
use utoipa::openapi::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};

pub trait DocsModule: Send {
    fn publish(&self, router: Router) -> Router;
}

/// Serves an OpenAPI document under `{base_path}/docs`.
///
/// - `GET {base_path}/docs/spec.json`: the document as JSON
/// - `GET {base_path}/docs`: a Scalar viewer loading the JSON above
#[derive(Clone)]
pub struct DocsPublisher {
    openapi: OpenApi,
    base_path: String,
}

impl std::fmt::Debug for DocsPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocsPublisher")
            .field("title", &self.openapi.info.title)
            .field("base_path", &self.base_path)
            .finish_non_exhaustive()
    }
}

impl DocsPublisher {
    pub fn new(openapi: OpenApi, base_path: impl Into<String>) -> Self {
        Self {
            openapi,
            base_path: base_path.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn viewer_path(&self) -> String {
        format!("{}/docs", self.base_path)
    }

    pub fn spec_path(&self) -> String {
        format!("{}/docs/spec.json", self.base_path)
    }

    fn viewer_html(&self) -> String {
        format!(
            r#"<!doctype html>
<html>
<head>
  <title>API Reference</title>
  <meta charset="utf-8"/>
  <meta name="viewport" content="width=device-width, initial-scale=1"/>
</head>
<body>
  <script id="api-reference" data-url="{}"></script>
  <script src="https://cdn.jsdelivr.net/npm/@scalar/api-reference"></script>
</body>
</html>"#,
            self.spec_path()
        )
    }
}

impl DocsModule for DocsPublisher {
    fn publish(&self, router: Router) -> Router {
        let openapi = self.openapi.clone();
        router
            .route(
                &self.spec_path(),
                get(move || {
                    let openapi = openapi.clone();
                    async move { Json(openapi) }
                }),
            )
            .merge(
                Scalar::with_url(self.viewer_path(), self.openapi.clone())
                    .custom_html(self.viewer_html()),
            )
    }
}
