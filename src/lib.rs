//! Pepper: an embeddable web server shell.
//!
//! Maps URL paths to a redirect, a rendered page or a static file, and
//! falls back to per-status error pages.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ───────────────▶ http::server ──▶ trace ──▶ access_log ──▶ http::service
//!                                                                    │
//!                        ┌───────────────┬───────────────┬───────────┤
//!                        ▼               ▼               ▼           ▼
//!                   routing::       controller     static files  error_pages
//!                   redirect        + render        (assets)     (resolver)
//!
//!     Cross-cutting: config · observability · security (/metrics) · lifecycle
//! ```

// Core subsystems
pub mod config;
pub mod controller;
pub mod error_pages;
pub mod http;
pub mod render;
pub mod routing;

// Content
pub mod assets;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::schema::ServerConfig;
pub use controller::{Controller, ControllerResult, ProcessingError, Reply};
pub use http::{HttpServer, Service, ServiceBuilder};
pub use lifecycle::Shutdown;
pub use routing::RouteMap;
