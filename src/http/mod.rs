//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, probes, /metrics behind basic auth)
//!     → middleware/trace.rs (X-Request-Id, request span)
//!     → middleware/access_log.rs (response capture, access log, metrics)
//!     → service.rs (redirect → controller → static file → error page)
//!     → static_files.rs (file bytes for static hits)
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;
pub mod service;
pub mod static_files;

pub use request::{RequestId, RequestIdExt, X_REQUEST_ID};
pub use server::HttpServer;
pub use service::{Service, ServiceBuilder};
