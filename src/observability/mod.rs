//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! http::middleware::trace       → request span (method, path, request_id, event)
//! http::middleware::access_log  → logging.rs (access_log target)
//!                               → metrics.rs (duration gauge + summary)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → GET /metrics (Prometheus scrape, basic auth)
//! ```

pub mod logging;
pub mod metrics;

pub use self::logging::init_logging;
pub use self::metrics::{init_metrics, record_request};
