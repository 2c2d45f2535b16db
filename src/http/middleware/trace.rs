//! Correlation id and request span middleware.

use axum::body::Body;
use axum::http::{HeaderValue, Method, Request};
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;

use super::is_exempt_path;
use crate::http::request::{RequestId, X_REQUEST_ID};

/// True when a request gets its own span.
pub fn is_traced(method: &Method, path: &str) -> bool {
    method != Method::OPTIONS && method != Method::HEAD && !is_exempt_path(path)
}

/// Assign or propagate `X-Request-Id`, then run the rest of the chain inside a request span.
///
/// The id is stored in request extensions for downstream layers and always echoed on the response.
pub async fn trace_requests(mut request: Request<Body>, next: Next) -> Response {
    let request_id =
        RequestId::from_headers(request.headers()).unwrap_or_else(RequestId::generate);
    request.extensions_mut().insert(request_id.clone());

    let mut response = if is_traced(request.method(), request.uri().path()) {
        let span = tracing::info_span!(
            "request",
            method = %request.method(),
            path = %request.uri().path(),
            request_id = %request_id,
            event = tracing::field::Empty,
        );
        next.run(request).instrument(span).await
    } else {
        next.run(request).await
    };

    match HeaderValue::from_str(request_id.as_str()) {
        Ok(value) => {
            response.headers_mut().insert(X_REQUEST_ID, value);
        }
        Err(e) => tracing::warn!(error = %e, "cannot echo request id"),
    }
    response
}
