//! Metrics collection and exposition.
//!
//! # Metrics
//! - `alunos_api_requests_total` (counter): requests by action and status
//! - `alunos_api_request_duration_seconds` (histogram): latency by action
//!
//! Recording is a no-op until a recorder is installed, so handlers record
//! unconditionally.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one handled request.
pub fn record_request(action: &'static str, status: u16, start: Instant) {
    metrics::counter!(
        "alunos_api_requests_total",
        "action" => action,
        "status" => status.to_string()
    )
    .increment(1);

    metrics::histogram!(
        "alunos_api_request_duration_seconds",
        "action" => action
    )
    .record(start.elapsed().as_secs_f64());
}
