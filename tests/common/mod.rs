//! Shared utilities for integration testing.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use include_dir::{include_dir, Dir};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use pepper::config::{parse_config, RedirectConfig, ServerConfig};
use pepper::controller::{Controller, ControllerResult, ProcessingError, Reply};
use pepper::http::{HttpServer, Service};
use pepper::lifecycle::Shutdown;
use pepper::security::Credentials;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower::ServiceExt;

pub static FIXTURES: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/tests/fixtures");

pub const FIXTURE_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

/// Rejects the submitted form with field details for the 400 template.
pub struct FormController;

#[async_trait]
impl Controller for FormController {
    async fn handle(&self, _request: Request<Body>) -> ControllerResult {
        Err(ProcessingError::new(StatusCode::BAD_REQUEST).with_data(&json!({
            "field": "email",
            "details": { "hint": "use a full address" },
        })))
    }
}

/// Redirects back to the request URL.
pub struct ReloadController;

#[async_trait]
impl Controller for ReloadController {
    async fn handle(&self, _request: Request<Body>) -> ControllerResult {
        Ok(Reply::redirect(StatusCode::SEE_OTHER, None))
    }
}

/// Always forbidden.
pub struct PrivateController;

#[async_trait]
impl Controller for PrivateController {
    async fn handle(&self, _request: Request<Body>) -> ControllerResult {
        Err(ProcessingError::new(StatusCode::FORBIDDEN))
    }
}

/// Configuration over the embedded test fixtures.
pub fn fixture_config() -> ServerConfig {
    let mut config = parse_config("", |_| None).unwrap();
    let http = &mut config.http;
    http.controllers.insert("/".into(), "index.jinja".into());
    http.controllers.insert("about".into(), "about.jinja".into());
    http.controllers.insert("broken".into(), "broken.jinja".into());
    http.includes = vec!["header.jinja".into(), "footer.jinja".into()];
    http.redirects.insert(
        "old-page".into(),
        RedirectConfig {
            location: "/new-page".into(),
            code: Some(302),
        },
    );
    http.error_pages.insert("400".into(), "400.jinja".into());
    http.error_pages.insert("403".into(), "errors/403.html".into());
    http.password.file = String::new();
    config
}

/// Same fixtures, served from the filesystem.
pub fn directory_config() -> ServerConfig {
    let mut config = fixture_config();
    let content = &mut config.http.content;
    content.use_embedded = false;
    content.templates_directory = format!("{FIXTURE_DIR}/templates");
    content.static_directory = format!("{FIXTURE_DIR}/static");
    config
}

pub fn build_service(config: &ServerConfig) -> Service {
    Service::builder(config)
        .bundle(&FIXTURES)
        .customize(|routes| {
            routes.insert("form".into(), Arc::new(FormController));
            routes.insert("/reload".into(), Arc::new(ReloadController));
            routes.insert("private".into(), Arc::new(PrivateController));
        })
        .build()
        .unwrap()
}

/// A recorder handle that is not installed globally.
pub fn metrics_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}

/// Full router (middleware, probes, metrics, dispatcher) for `config`.
pub fn router(config: &ServerConfig) -> Router {
    HttpServer::build_router(
        Arc::new(build_service(config)),
        Arc::new(Credentials::default()),
        metrics_handle(),
    )
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Send one request through `router` and collect the response.
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, body)
}

pub fn text(body: &Bytes) -> String {
    String::from_utf8(body.to_vec()).unwrap()
}

/// Bundled default page for `code`.
pub fn default_page(code: u16) -> &'static [u8] {
    pepper::error_pages::DEFAULT_ERROR_PAGES
        .get_file(format!("{code}.html"))
        .unwrap()
        .contents()
}

/// A server on an ephemeral port.
pub struct RunningServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub task: JoinHandle<std::io::Result<()>>,
}

pub async fn start_server(config: ServerConfig) -> RunningServer {
    let service = build_service(&config);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, service, metrics_handle());
    let task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    RunningServer {
        addr,
        shutdown,
        task,
    }
}
