//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_router_request_duration` (gauge): duration of the latest request, seconds
//! - `http_router_request` (summary): request duration distribution, seconds
//!
//! Both carry `code`, `method` and `path` labels.
//!
//! # Design Decisions
//! - The Prometheus recorder is installed once at startup; the returned handle
//!   renders the exposition for `/metrics`
//! - Histograms are exported as summaries (no buckets configured)

use std::time::Duration;

use axum::http::StatusCode;
use metrics::{describe_gauge, describe_histogram, gauge, histogram, Unit};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

pub const REQUEST_DURATION_GAUGE: &str = "http_router_request_duration";
pub const REQUEST_DURATION_SUMMARY: &str = "http_router_request";

/// Install the global Prometheus recorder.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    describe_metrics();
    Ok(handle)
}

pub fn describe_metrics() {
    describe_gauge!(
        REQUEST_DURATION_GAUGE,
        Unit::Seconds,
        "Duration of the HTTP request"
    );
    describe_histogram!(
        REQUEST_DURATION_SUMMARY,
        Unit::Seconds,
        "Summary of the HTTP request duration"
    );
}

/// Record one completed request.
pub fn record_request(status: StatusCode, method: &str, path: &str, elapsed: Duration) {
    let seconds = elapsed.as_secs_f64();
    let code = status.as_u16().to_string();

    gauge!(
        REQUEST_DURATION_GAUGE,
        "code" => code.clone(),
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .set(seconds);
    histogram!(
        REQUEST_DURATION_SUMMARY,
        "code" => code,
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(seconds);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_request_is_exported() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            describe_metrics();
            record_request(
                StatusCode::NOT_FOUND,
                "GET",
                "/missing.png",
                Duration::from_millis(250),
            );
        });

        let rendered = handle.render();
        assert!(rendered.contains("http_router_request_duration{"));
        assert!(rendered.contains(r#"code="404""#));
        assert!(rendered.contains(r#"path="/missing.png""#));
        assert!(rendered.contains("http_router_request_count"));
    }
}
