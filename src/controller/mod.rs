//! Controllers: the units the dispatcher hands a request to.
//!
//! # Data Flow
//! ```text
//! Request<Body>
//!     → Controller::handle
//!     → Ok(Reply)            status + optional Location/Content-Type + body
//!     → Err(ProcessingError) status + template context (+ optional pre-rendered body)
//! ```
//!
//! # Design Decisions
//! - One async capability; the route table stores `Arc<dyn Controller>`
//! - `ModelController` is the built-in variant; applications add their own
//!   through the route customization hook at startup
//! - A failure is a value, not a fault: it selects an error page

pub mod model;

use std::fmt;

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use minijinja::Value;
use serde::Serialize;
use thiserror::Error;

pub use model::{ModelController, PageModel};

/// Default content type for pages and error pages.
pub const TEXT_HTML: &str = "text/html";

/// Outcome of a controller invocation.
pub type ControllerResult = Result<Reply, ProcessingError>;

/// A request handler bound to one route key.
#[async_trait]
pub trait Controller: Send + Sync {
    async fn handle(&self, request: Request<Body>) -> ControllerResult;
}

/// Successful controller response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: StatusCode,
    /// Redirect target; the request URL is used when a redirect status has none.
    pub location: Option<String>,
    /// Defaults to `text/html` when absent.
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl Reply {
    /// `200 text/html` with `body`.
    pub fn html(body: impl Into<Bytes>) -> Self {
        Self {
            status: StatusCode::OK,
            location: None,
            content_type: Some(TEXT_HTML.to_string()),
            body: body.into(),
        }
    }

    /// Redirect with `status`; `None` redirects back to the request URL.
    pub fn redirect(status: StatusCode, location: Option<String>) -> Self {
        Self {
            status,
            location,
            content_type: None,
            body: Bytes::new(),
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// True for 301, 302, 303, 307 and 308.
    pub fn is_redirect(&self) -> bool {
        is_redirect_status(self.status)
    }
}

/// Statuses that make the dispatcher emit a `Location` header for a controller reply.
pub fn is_redirect_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

/// Deliberate controller failure, resolved through the error pages.
#[derive(Clone, Error)]
#[error("request processing failed with status {response_code}")]
pub struct ProcessingError {
    pub response_code: StatusCode,
    /// Context handed to a templated error page.
    pub data: Value,
    pub content_type: Option<String>,
    /// Pre-rendered body; takes precedence over the configured error page.
    pub body: Option<Bytes>,
}

impl ProcessingError {
    pub fn new(response_code: StatusCode) -> Self {
        Self {
            response_code,
            data: Value::UNDEFINED,
            content_type: None,
            body: None,
        }
    }

    /// Attach template context.
    pub fn with_data<T: Serialize>(mut self, data: &T) -> Self {
        self.data = Value::from_serialize(data);
        self
    }

    /// Supply the response body directly instead of an error page.
    pub fn with_body(mut self, body: impl Into<Bytes>, content_type: Option<String>) -> Self {
        self.body = Some(body.into());
        self.content_type = content_type;
        self
    }
}

impl fmt::Debug for ProcessingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessingError")
            .field("response_code", &self.response_code)
            .field("data", &self.data)
            .field("content_type", &self.content_type)
            .field("body_len", &self.body.as_ref().map(Bytes::len))
            .finish()
    }
}
