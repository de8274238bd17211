//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define proxy metrics (requests, latency, failures, rejections)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by body kind, status
//! - `proxy_request_duration_seconds` (histogram): time to response headers
//! - `proxy_upstream_failures_total` (counter): fetch errors
//! - `proxy_rejected_requests_total` (counter): invalid targets by reason
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Labels are low-cardinality: never the target URL

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed proxy request. `kind` is `html`, `raw` or `error`.
pub fn record_request(kind: &'static str, status: u16, start: Instant) {
    counter!("proxy_requests_total", "kind" => kind, "status" => status.to_string()).increment(1);
    histogram!("proxy_request_duration_seconds", "kind" => kind)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_upstream_failure() {
    counter!("proxy_upstream_failures_total").increment(1);
}

/// Record a request rejected before any upstream fetch.
pub fn record_rejected(reason: &'static str) {
    counter!("proxy_rejected_requests_total", "reason" => reason).increment(1);
}
