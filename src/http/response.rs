//! Response observation for access logging.
//!
//! # Responsibilities
//! - Wrap a response body to count the bytes written to the client
//! - Measure the elapsed time from middleware entry to body completion
//! - Hand the finished capture to a completion callback exactly once
//!
//! # Design Decisions
//! - The wrapper owns the body for the lifetime of one response; nothing is shared
//! - Completion fires at end of stream or on drop, so aborted responses are still observed

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use axum::body::{Body, Bytes};
use axum::http::StatusCode;
use axum::response::Response;
use http_body::{Body as HttpBody, Frame, SizeHint};

/// What was sent for one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseCapture {
    status: StatusCode,
    bytes_written: u64,
    elapsed: Duration,
    completed: bool,
}

impl ResponseCapture {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Time from middleware entry to the end of the body.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// False when the body was dropped before it was fully written.
    pub fn completed(&self) -> bool {
        self.completed
    }
}

type OnComplete = Box<dyn FnOnce(ResponseCapture) + Send + 'static>;

/// Body decorator that reports a `ResponseCapture` when the response finishes.
pub struct CapturingBody {
    inner: Body,
    status: StatusCode,
    started: Instant,
    bytes_written: u64,
    on_complete: Option<OnComplete>,
}

impl CapturingBody {
    fn finish(&mut self, completed: bool) {
        if let Some(on_complete) = self.on_complete.take() {
            on_complete(ResponseCapture {
                status: self.status,
                bytes_written: self.bytes_written,
                elapsed: self.started.elapsed(),
                completed,
            });
        }
    }
}

/// Re-wrap `response` so `on_complete` observes its status, size and duration.
pub fn capture<F>(response: Response, started: Instant, on_complete: F) -> Response
where
    F: FnOnce(ResponseCapture) + Send + 'static,
{
    let (parts, body) = response.into_parts();
    let body = CapturingBody {
        inner: body,
        status: parts.status,
        started,
        bytes_written: 0,
        on_complete: Some(Box::new(on_complete)),
    };
    Response::from_parts(parts, Body::new(body))
}

impl HttpBody for CapturingBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = &mut *self;
        let polled = Pin::new(&mut this.inner).poll_frame(cx);
        match &polled {
            Poll::Ready(Some(Ok(frame))) => {
                if let Some(data) = frame.data_ref() {
                    this.bytes_written += data.len() as u64;
                }
            }
            Poll::Ready(Some(Err(e))) => {
                tracing::warn!(error = %e, "cannot write response body");
                this.finish(false);
            }
            Poll::Ready(None) => this.finish(true),
            Poll::Pending => {}
        }
        polled
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl Drop for CapturingBody {
    fn drop(&mut self) {
        let completed = self.inner.is_end_stream();
        self.finish(completed);
    }
}
