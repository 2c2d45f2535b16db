//! Request metadata shared by the middleware chain and the dispatcher.
//!
//! # Responsibilities
//! - Correlation id: read from `X-Request-Id` or generate one (UUID v4)
//! - Carry the id through request extensions to every downstream layer
//! - Derive the client address for access logging

use std::fmt;
use std::net::{IpAddr, SocketAddr};

use axum::extract::ConnectInfo;
use axum::http::header::{HeaderName, USER_AGENT};
use axum::http::{HeaderMap, Request};
use uuid::Uuid;

/// Correlation id header.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Client address header set by proxies.
pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Per-request correlation id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a fresh id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The inbound `X-Request-Id`, if present and non-blank.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get(&X_REQUEST_ID)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Access to the correlation id stored in request extensions.
pub trait RequestIdExt {
    fn request_id(&self) -> Option<&RequestId>;

    /// The id, or `"unknown"` outside the tracing middleware.
    fn request_id_or_unknown(&self) -> String {
        self.request_id()
            .map(ToString::to_string)
            .unwrap_or_else(|| "unknown".to_string())
    }
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> Option<&RequestId> {
        self.extensions().get::<RequestId>()
    }
}

/// Client address: first `X-Forwarded-For` entry, else the peer address, without port.
pub fn client_ip<B>(request: &Request<B>) -> String {
    let forwarded = request
        .headers()
        .get(&X_FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    if let Some(forwarded) = forwarded {
        return strip_port(forwarded).to_string();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// `"10.0.0.1:5000"` → `"10.0.0.1"`, `"[::1]:80"` → `"::1"`; bare addresses are unchanged.
pub fn strip_port(addr: &str) -> &str {
    if addr.parse::<IpAddr>().is_ok() {
        return addr;
    }
    if let Some(rest) = addr.strip_prefix('[') {
        if let Some((host, _)) = rest.split_once(']') {
            return host;
        }
    }
    match addr.rsplit_once(':') {
        Some((host, _)) if !host.contains(':') => host,
        _ => addr,
    }
}

/// The `User-Agent` header, or an empty string.
pub fn user_agent<B>(request: &Request<B>) -> String {
    request
        .headers()
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
