//! Metrics collection and exposition.
//!
//! # Metrics
//! - `lifecycle_step_total` (counter): startup step outcomes by step, outcome
//! - `lifecycle_step_duration_seconds` (histogram): time spent in each step
//! - `lifecycle_shutdown_total` (counter): shutdown hook runs by outcome
//! - `http_requests_total` (counter): served requests by method, status

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record the outcome of one startup step.
pub fn record_step(step: &'static str, outcome: &'static str, start: Instant) {
    counter!("lifecycle_step_total", "step" => step, "outcome" => outcome).increment(1);
    histogram!("lifecycle_step_duration_seconds", "step" => step)
        .record(start.elapsed().as_secs_f64());
}

/// Record a run of the shutdown hook.
pub fn record_shutdown(outcome: &'static str) {
    counter!("lifecycle_shutdown_total", "outcome" => outcome).increment(1);
}

/// Record a served HTTP request.
pub fn record_request(method: &str, status: u16) {
    counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}
