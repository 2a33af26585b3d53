//! Metrics collection and exposition.
//!
//! # Metrics
//! - `mirror_requests_total` (counter): requests by method, status, variant
//! - `mirror_request_duration_seconds` (histogram): latency by variant
//! - `mirror_rejected_requests_total` (counter): inbound rejections by reason
//! - `mirror_upstream_errors_total` (counter): failed origin calls by variant

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter started"),
        Err(err) => tracing::error!(error = %err, "Failed to start metrics exporter"),
    }
}

/// Record one completed request.
pub fn record_request(method: &str, status: u16, variant: &str, start: Instant) {
    counter!(
        "mirror_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "variant" => variant.to_string()
    )
    .increment(1);
    histogram!(
        "mirror_request_duration_seconds",
        "variant" => variant.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record an inbound request rejected before reaching the origin.
pub fn record_rejected(variant: &str, reason: &'static str) {
    counter!(
        "mirror_rejected_requests_total",
        "variant" => variant.to_string(),
        "reason" => reason
    )
    .increment(1);
}

/// Record a failed origin call.
pub fn record_upstream_error(variant: &str) {
    counter!(
        "mirror_upstream_errors_total",
        "variant" => variant.to_string()
    )
    .increment(1);
}
