//! Request dispatcher.
//!
//! # Responsibilities
//! - Strip the context prefix and form the route key
//! - Dispatch in order: redirect table, controller table, static files, 404 page
//! - Turn controller replies and processing errors into HTTP responses
//!
//! # Data Flow
//! ```text
//! request path
//!     → percent-decoded (not UTF-8 → 404)
//!     → route_key (context stripped, leading '/' removed)
//!     → redirects[key]    → Location + configured code
//!     → routes[key]       → Controller::handle → reply | error page
//!     → static_assets     → file bytes
//!     → error page for 404
//! ```
//!
//! # Design Decisions
//! - Tables are built once by `ServiceBuilder` and never mutated afterwards,
//!   so a `Service` is shared across requests behind an `Arc` without locking
//! - Template rendering and error page lookup run inline on the request task

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use include_dir::Dir;
use percent_encoding::percent_decode_str;
use tracing::Span;

use crate::assets::{resolve_root, AssetSource};
use crate::config::{ConfigError, ServerConfig};
use crate::controller::{ProcessingError, Reply, TEXT_HTML};
use crate::error_pages::{ErrorPageResolver, ErrorPageTable};
use crate::http::request::RequestIdExt;
use crate::http::static_files;
use crate::routing::{build_redirects, build_routes, route_key, RedirectMap, RouteMap};

type EnvLookup<'a> = Box<dyn Fn(&str) -> Option<String> + 'a>;
type Customizer<'a> = Box<dyn FnOnce(&mut RouteMap) + 'a>;

/// Builds a `Service` from configuration.
pub struct ServiceBuilder<'a> {
    config: &'a ServerConfig,
    bundle: Option<&'static Dir<'static>>,
    customize: Option<Customizer<'a>>,
    env: EnvLookup<'a>,
}

impl<'a> ServiceBuilder<'a> {
    pub fn new(config: &'a ServerConfig) -> Self {
        Self {
            config,
            bundle: None,
            customize: None,
            env: Box::new(|name| std::env::var(name).ok()),
        }
    }

    /// Content bundle holding the templates and static directories.
    pub fn bundle(mut self, bundle: &'static Dir<'static>) -> Self {
        self.bundle = Some(bundle);
        self
    }

    /// Hook run once over the route table to add, replace or remove controllers.
    pub fn customize<F>(mut self, customize: F) -> Self
    where
        F: FnOnce(&mut RouteMap) + 'a,
    {
        self.customize = Some(Box::new(customize));
        self
    }

    /// Variable lookup for `env.NAME` redirect locations. Defaults to the process environment.
    pub fn env_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + 'a,
    {
        self.env = Box::new(lookup);
        self
    }

    pub fn build(self) -> Result<Service, ConfigError> {
        let http = &self.config.http;
        let content = &http.content;

        let templates = resolve_root(content.use_embedded, self.bundle, &content.templates_directory)?;
        let static_assets = resolve_root(content.use_embedded, self.bundle, &content.static_directory)?;
        if content.use_embedded {
            tracing::info!("using embedded templates");
        } else {
            tracing::info!(
                templates = %content.templates_directory,
                static_files = %content.static_directory,
                "using templates from the file system"
            );
        }

        let customize = self.customize;
        let routes = build_routes(self.config, &templates, |routes| {
            if let Some(customize) = customize {
                customize(routes);
            }
        });
        let env = &self.env;
        let redirects = build_redirects(http, |name| env(name))?;
        let table = ErrorPageTable::from_config(&http.error_pages, &content.template_suffix)?;
        let includes: Arc<[String]> = http.includes.clone().into();
        let error_pages =
            ErrorPageResolver::new(table, templates, Arc::clone(&static_assets), includes);

        tracing::info!(
            context = %http.context,
            controllers = routes.len(),
            redirects = redirects.len(),
            error_pages = error_pages.table().len(),
            "dispatcher ready"
        );

        Ok(Service {
            context: http.context.clone(),
            routes,
            redirects,
            error_pages,
            static_assets,
        })
    }
}

/// The request dispatcher.
pub struct Service {
    context: String,
    routes: RouteMap,
    redirects: RedirectMap,
    error_pages: ErrorPageResolver,
    static_assets: Arc<dyn AssetSource>,
}

impl Service {
    pub fn builder(config: &ServerConfig) -> ServiceBuilder<'_> {
        ServiceBuilder::new(config)
    }

    /// Answer one request.
    pub async fn dispatch(&self, request: Request<Body>) -> Response {
        let span = Span::current();
        let request_id = request.request_id_or_unknown();
        let Ok(path) = percent_decode_str(request.uri().path()).decode_utf8() else {
            span.record("event", "controller-error");
            tracing::info!(request_id = %request_id, uri = %request.uri(), "path is not valid UTF-8");
            return self.error_response(ProcessingError::new(StatusCode::NOT_FOUND));
        };
        let path = path.into_owned();

        let Some(key) = route_key(&self.context, &path) else {
            span.record("event", "controller-error");
            tracing::info!(request_id = %request_id, path = %path, "path outside context");
            return self.error_response(ProcessingError::new(StatusCode::NOT_FOUND));
        };

        if let Some(redirect) = self.redirects.get(key) {
            span.record("event", "redirect");
            return redirect_response(redirect.code, &redirect.location);
        }

        if let Some(controller) = self.routes.get(key) {
            span.record("event", "handler");
            let original_uri = request.uri().to_string();
            return match controller.handle(request).await {
                Err(error) => {
                    span.record("event", "controller-error");
                    tracing::info!(
                        request_id = %request_id,
                        path = %key,
                        status = error.response_code.as_u16(),
                        "controller failed"
                    );
                    self.error_response(error)
                }
                Ok(reply) if reply.is_redirect() => {
                    span.record("event", "redirect");
                    let location = reply
                        .location
                        .as_deref()
                        .filter(|location| !location.is_empty())
                        .unwrap_or(&original_uri);
                    redirect_response(reply.status, location)
                }
                Ok(reply) => {
                    span.record("event", "response");
                    reply_response(reply)
                }
            };
        }

        span.record("event", "static-file");
        if self.static_assets.exists(key) {
            return static_files::serve(self.static_assets.as_ref(), key, request).await;
        }

        span.record("event", "controller-error");
        tracing::info!(request_id = %request_id, path = %key, "static file does not exist");
        self.error_response(ProcessingError::new(StatusCode::NOT_FOUND))
    }

    /// Response for a processing error: its own body if it carries one, else the error page.
    ///
    /// An error page that cannot be produced leaves the body empty; the status is kept.
    pub fn error_response(&self, error: ProcessingError) -> Response {
        let status = error.response_code;
        let content_type = error
            .content_type
            .clone()
            .unwrap_or_else(|| TEXT_HTML.to_string());

        let body = match error.body.clone() {
            Some(body) => body,
            None => match self.error_pages.resolve(&error) {
                Ok(Some(body)) => body,
                Ok(None) => Bytes::new(),
                Err(e) => {
                    tracing::error!(
                        status = status.as_u16(),
                        error = %e,
                        "cannot produce error page"
                    );
                    Bytes::new()
                }
            },
        };

        (status, [(header::CONTENT_TYPE, content_type)], body).into_response()
    }
}

fn redirect_response(code: StatusCode, location: &str) -> Response {
    (code, [(header::LOCATION, location.to_string())]).into_response()
}

fn reply_response(reply: Reply) -> Response {
    let content_type = reply.content_type.unwrap_or_else(|| TEXT_HTML.to_string());
    (reply.status, [(header::CONTENT_TYPE, content_type)], reply.body).into_response()
}

/// Axum fallback handler.
pub async fn dispatch(State(service): State<Arc<Service>>, request: Request<Body>) -> Response {
    service.dispatch(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{parse_config, RedirectConfig};
    use crate::controller::{Controller, ControllerResult};
    use async_trait::async_trait;
    use include_dir::include_dir;

    static FIXTURES: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/tests/fixtures");

    struct Fixed(ControllerResult);

    #[async_trait]
    impl Controller for Fixed {
        async fn handle(&self, _request: Request<Body>) -> ControllerResult {
            self.0.clone()
        }
    }

    fn config() -> ServerConfig {
        let mut config = parse_config("", |_| None).unwrap();
        config.http.controllers.insert("about".into(), "about.jinja".into());
        config.http.includes = vec!["header.jinja".into(), "footer.jinja".into()];
        config.http.redirects.insert(
            "old".into(),
            RedirectConfig {
                location: "/about".into(),
                code: Some(302),
            },
        );
        config
    }

    fn service(config: &ServerConfig) -> Service {
        Service::builder(config)
            .bundle(&FIXTURES)
            .customize(|routes| {
                routes.insert(
                    "/moved".into(),
                    Arc::new(Fixed(Ok(Reply::redirect(StatusCode::SEE_OTHER, None)))),
                );
                routes.insert(
                    "teapot".into(),
                    Arc::new(Fixed(Err(ProcessingError::new(StatusCode::IM_A_TEAPOT)
                        .with_body("short and stout", Some("text/plain".into()))))),
                );
            })
            .build()
            .unwrap()
    }

    async fn send(service: &Service, uri: &str) -> (StatusCode, axum::http::HeaderMap, Bytes) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = service.dispatch(request).await;
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, body)
    }

    #[tokio::test]
    async fn test_redirect_wins() {
        let service = service(&config());
        let (status, headers, _) = send(&service, "/old").await;
        assert_eq!(status, StatusCode::FOUND);
        assert_eq!(headers[header::LOCATION], "/about");
    }

    #[tokio::test]
    async fn test_controller_page() {
        let service = service(&config());
        let (status, headers, body) = send(&service, "/about").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "text/html");
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("<h1>About us</h1>"));
        assert!(body.contains("fixture footer"));
    }

    #[tokio::test]
    async fn test_redirect_reply_without_location_uses_request_uri() {
        let service = service(&config());
        let (status, headers, _) = send(&service, "/moved?x=1").await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(headers[header::LOCATION], "/moved?x=1");
    }

    #[tokio::test]
    async fn test_error_with_own_body() {
        let service = service(&config());
        let (status, headers, body) = send(&service, "/teapot").await;
        assert_eq!(status, StatusCode::IM_A_TEAPOT);
        assert_eq!(headers[header::CONTENT_TYPE], "text/plain");
        assert_eq!(body.as_ref(), b"short and stout");
    }

    #[tokio::test]
    async fn test_missing_file_gets_default_404() {
        let service = service(&config());
        let (status, headers, body) = send(&service, "/missing.png").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(headers[header::CONTENT_TYPE], "text/html");
        let expected = crate::error_pages::DEFAULT_ERROR_PAGES
            .get_file("404.html")
            .unwrap()
            .contents();
        assert_eq!(body.as_ref(), expected);
    }

    #[tokio::test]
    async fn test_context_prefix() {
        let mut config = config();
        config.http.context = "/site".into();
        let service = service(&config);

        assert_eq!(send(&service, "/site/about").await.0, StatusCode::OK);
        assert_eq!(send(&service, "/site/robots.txt").await.0, StatusCode::OK);
        assert_eq!(send(&service, "/about").await.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_path_is_percent_decoded() {
        let service = service(&config());
        let (status, _, body) = send(&service, "/my%20file.txt").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with(b"a file with a space"));

        assert_eq!(send(&service, "/ab%6Fut").await.0, StatusCode::OK);
        assert_eq!(send(&service, "/%FF%FE").await.0, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_unset_redirect_variable_fails_build() {
        let mut config = config();
        config.http.redirects.insert(
            "docs".into(),
            RedirectConfig {
                location: "env.PEPPER_TEST_DOCS_URL".into(),
                code: None,
            },
        );
        let result = Service::builder(&config)
            .bundle(&FIXTURES)
            .env_lookup(|_| None)
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::UnsetRedirectVariable { .. })
        ));
    }

    #[test]
    fn test_embedded_without_bundle_fails() {
        let config = config();
        assert!(matches!(
            Service::builder(&config).build(),
            Err(ConfigError::MissingBundle)
        ));
    }
}
