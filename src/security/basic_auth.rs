//! HTTP basic authentication middleware.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::security::credentials::Credentials;

/// Challenge sent with every rejection.
pub const REALM: &str = "Basic realm=Restricted";

/// Admit the request only with a user and password that match the credential set.
pub async fn basic_auth(
    State(credentials): State<Arc<Credentials>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some((user, password)) = basic_credentials(request.headers()) else {
        return unauthorized();
    };
    if user.trim().is_empty() || password.trim().is_empty() {
        return unauthorized();
    }

    let verified = tokio::task::spawn_blocking(move || credentials.verify(&user, &password))
        .await
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "password verification task failed");
            false
        });

    if verified {
        next.run(request).await
    } else {
        unauthorized()
    }
}

/// User and password from an `Authorization: Basic` header.
pub fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, password) = decoded.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}

pub fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, [(WWW_AUTHENTICATE, REALM)]).into_response()
}
