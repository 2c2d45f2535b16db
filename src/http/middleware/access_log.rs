//! Access logging and request metrics.

use std::time::Instant;

use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use super::is_exempt_path;
use crate::http::request::{client_ip, user_agent, RequestIdExt};
use crate::http::response::{capture, ResponseCapture};
use crate::observability::metrics;

/// Request fields recorded alongside the captured response.
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    pub client_ip: String,
    pub request_id: String,
    pub method: String,
    /// Path and query as requested.
    pub uri: String,
    pub path: String,
    pub user_agent: String,
}

impl AccessLogEntry {
    pub fn from_request<B>(request: &Request<B>) -> Self {
        let path = request.uri().path().to_string();
        let uri = request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| path.clone());
        Self {
            client_ip: client_ip(request),
            request_id: request.request_id_or_unknown(),
            method: request.method().to_string(),
            uri,
            path,
            user_agent: user_agent(request),
        }
    }

    /// One log line and two metric observations.
    pub fn emit(&self, capture: &ResponseCapture) {
        let elapsed_secs = capture.elapsed().as_secs_f64();
        tracing::info!(
            target: "access_log",
            client_ip = %self.client_ip,
            request_id = %self.request_id,
            method = %self.method,
            status = capture.status().as_u16(),
            uri = %self.uri,
            elapsed_secs,
            bytes = capture.bytes_written(),
            user_agent = %self.user_agent,
            completed = capture.completed(),
            "request completed"
        );
        metrics::record_request(capture.status(), &self.method, &self.path, capture.elapsed());
    }
}

/// Observe the full response, including body streaming, and log it on completion.
pub async fn access_log(request: Request<Body>, next: Next) -> Response {
    let started = Instant::now();
    if is_exempt_path(request.uri().path()) {
        return next.run(request).await;
    }

    let entry = AccessLogEntry::from_request(&request);
    let response = next.run(request).await;
    capture(response, started, move |captured| entry.emit(&captured))
}
