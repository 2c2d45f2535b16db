//! Instrumentation middleware, outermost first:
//!
//! ```text
//! trace.rs      correlation id + request span
//!     → access_log.rs  status/size/duration capture, log line, metrics
//!         → handler (dispatcher, health probes, metrics endpoint)
//! ```

pub mod access_log;
pub mod trace;

pub use self::access_log::access_log;
pub use self::trace::trace_requests;

/// Probe and scrape endpoints that are neither traced nor access-logged.
pub const EXEMPT_PATHS: [&str; 3] = ["/healthz", "/ready", "/metrics"];

pub fn is_exempt_path(path: &str) -> bool {
    EXEMPT_PATHS.contains(&path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exempt_paths() {
        assert!(is_exempt_path("/healthz"));
        assert!(is_exempt_path("/ready"));
        assert!(is_exempt_path("/metrics"));
        assert!(!is_exempt_path("/metrics/extra"));
        assert!(!is_exempt_path("/about"));
    }
}
