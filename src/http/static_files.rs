//! Static file responses.
//!
//! # Design Decisions
//! - Filesystem roots go through `tower_http::services::ServeDir`, which supplies
//!   content type, `Last-Modified`, conditional and range handling
//! - Embedded roots answer with the file bytes, a content type guessed from the
//!   extension and a content-hash `ETag`
//! - Embedded responses honour `If-None-Match`, `If-Range` and single `bytes` ranges;
//!   multipart ranges are answered with 416, as `ServeDir` does

use std::borrow::Cow;
use std::path::Path;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderValue, Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use tower::ServiceExt;
use tower_http::services::ServeDir;

use crate::assets::AssetSource;

/// Characters re-escaped when a decoded key is put back into a request path.
const PATH_ESCAPES: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Serve the file `key` from `assets`. The caller has already checked that it exists.
pub async fn serve(assets: &dyn AssetSource, key: &str, request: Request<Body>) -> Response {
    match assets.local_root() {
        Some(root) => serve_directory(root, key, request).await,
        None => serve_embedded(assets, key, request.headers()),
    }
}

async fn serve_directory(root: &Path, key: &str, mut request: Request<Body>) -> Response {
    let path = utf8_percent_encode(key, PATH_ESCAPES);
    let target = match request.uri().query() {
        Some(query) => format!("/{path}?{query}"),
        None => format!("/{path}"),
    };
    match target.parse::<Uri>() {
        Ok(uri) => *request.uri_mut() = uri,
        Err(e) => {
            tracing::warn!(path = %key, error = %e, "cannot build static file uri");
            return StatusCode::BAD_REQUEST.into_response();
        }
    }

    match ServeDir::new(root).oneshot(request).await {
        Ok(response) => response.map(Body::new),
        Err(never) => match never {},
    }
}

fn serve_embedded(assets: &dyn AssetSource, key: &str, headers: &HeaderMap) -> Response {
    let body = match assets.read(key) {
        Ok(Cow::Borrowed(bytes)) => Bytes::from_static(bytes),
        Ok(Cow::Owned(bytes)) => Bytes::from(bytes),
        Err(e) => {
            tracing::error!(path = %key, error = %e, "cannot read static file");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    let etag = assets.etag(key);

    let mut response = match etag {
        Some(etag) if none_match(headers, etag) => StatusCode::NOT_MODIFIED.into_response(),
        _ => ranged_body(key, body, headers, etag),
    };

    let response_headers = response.headers_mut();
    response_headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    if let Some(value) = etag.and_then(|etag| HeaderValue::from_str(etag).ok()) {
        response_headers.insert(header::ETAG, value);
    }
    response
}

/// Full body, or the requested slice of it when a usable `Range` header is present.
fn ranged_body(key: &str, body: Bytes, headers: &HeaderMap, etag: Option<&str>) -> Response {
    let mime = mime_guess::from_path(key).first_or_octet_stream();
    let content_type = [(header::CONTENT_TYPE, mime.essence_str().to_string())];

    let range = headers
        .get(header::RANGE)
        .and_then(|value| value.to_str().ok())
        .filter(|_| if_range_holds(headers, etag));
    let Some(range) = range else {
        return (StatusCode::OK, content_type, body).into_response();
    };

    let size = body.len() as u64;
    let ranges = http_range_header::parse_range_header(range)
        .and_then(|parsed| parsed.validate(size));
    match ranges.as_deref() {
        Ok([range]) => {
            let (start, end) = (*range.start(), *range.end());
            let content_range = format!("bytes {start}-{end}/{size}");
            (
                StatusCode::PARTIAL_CONTENT,
                content_type,
                [(header::CONTENT_RANGE, content_range)],
                body.slice(start as usize..=end as usize),
            )
                .into_response()
        }
        _ => {
            tracing::debug!(path = %key, range = %range, "unsatisfiable range");
            (
                StatusCode::RANGE_NOT_SATISFIABLE,
                [(header::CONTENT_RANGE, format!("bytes */{size}"))],
            )
                .into_response()
        }
    }
}

/// True when `If-None-Match` lists `etag` or `*`.
fn none_match(headers: &HeaderMap, etag: &str) -> bool {
    headers
        .get_all(header::IF_NONE_MATCH)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(|candidate| candidate.trim().trim_start_matches("W/"))
        .any(|candidate| candidate == "*" || candidate == etag)
}

/// A `Range` applies unless `If-Range` names a different entity tag.
fn if_range_holds(headers: &HeaderMap, etag: Option<&str>) -> bool {
    match headers.get(header::IF_RANGE).map(|value| value.to_str()) {
        None => true,
        Some(Ok(value)) => Some(value.trim()) == etag,
        Some(Err(_)) => false,
    }
}
