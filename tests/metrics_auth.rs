//! `/metrics` behind basic authentication.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use axum::http::{Request, StatusCode};
use axum::Router;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use metrics_exporter_prometheus::PrometheusBuilder;
use pepper::http::HttpServer;
use pepper::observability::metrics::record_request;
use pepper::security::Credentials;
use tempfile::NamedTempFile;

mod common;

use common::{build_service, fixture_config, get, metrics_handle, send, text};

fn password_file(user: &str, password: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "# scrape users").unwrap();
    writeln!(file, "{user}:{}", bcrypt::hash(password, 4).unwrap()).unwrap();
    file
}

fn server_router(password_file: &str) -> Router {
    let mut config = fixture_config();
    config.http.password.file = password_file.to_string();
    let service = build_service(&config);
    HttpServer::new(config, service, metrics_handle()).router()
}

fn scrape(user: &str, password: &str) -> Request<Body> {
    let token = STANDARD.encode(format!("{user}:{password}"));
    Request::builder()
        .uri("/metrics")
        .header(AUTHORIZATION, format!("Basic {token}"))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_metrics_requires_credentials() {
    let file = password_file("prometheus", "scrape-me");
    let router = server_router(file.path().to_str().unwrap());

    let (status, headers, _) = send(&router, get("/metrics")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(headers[WWW_AUTHENTICATE], "Basic realm=Restricted");

    let (status, _, _) = send(&router, scrape("prometheus", "wrong")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = send(&router, scrape("someone", "scrape-me")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = send(&router, scrape("prometheus", " ")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = send(&router, scrape("prometheus", "scrape-me")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_missing_password_file_denies_everyone() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join(".passwd");
    let router = server_router(missing.to_str().unwrap());

    let (status, _, _) = send(&router, scrape("prometheus", "scrape-me")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_exposition_contains_request_metrics() {
    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();
    metrics::with_local_recorder(&recorder, || {
        record_request(StatusCode::OK, "GET", "/about", Duration::from_millis(12));
    });

    let file = password_file("prometheus", "scrape-me");
    let credentials = Credentials::load(file.path()).unwrap();
    let config = fixture_config();
    let router = HttpServer::build_router(
        Arc::new(build_service(&config)),
        Arc::new(credentials),
        handle,
    );

    let (status, _, body) = send(&router, scrape("prometheus", "scrape-me")).await;
    let body = text(&body);
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("http_router_request_duration{"));
    assert!(body.contains(r#"path="/about""#));
    assert!(body.contains("http_router_request_count"));
}
