//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): inbound searches by kind, status
//! - `gateway_request_duration_seconds` (histogram): inbound latency
//! - `gateway_upstream_attempts_total` (counter): upstream attempts by call, outcome
//! - `gateway_circuit_open` (gauge): 1=open, 0=closed
//!
//! Recording goes through the `metrics` facade and is a no-op until
//! [`init_metrics`] installs the Prometheus exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint. Must run inside the tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            metrics::describe_counter!("gateway_requests_total", "Inbound search requests");
            metrics::describe_histogram!(
                "gateway_request_duration_seconds",
                metrics::Unit::Seconds,
                "Inbound search latency"
            );
            metrics::describe_counter!("gateway_upstream_attempts_total", "Upstream call attempts");
            metrics::describe_gauge!("gateway_circuit_open", "Circuit breaker open (1) or closed (0)");
            tracing::info!(address = %addr, "Metrics endpoint listening");
        }
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(kind: &'static str, status: u16, start: Instant) {
    metrics::counter!(
        "gateway_requests_total",
        "kind" => kind,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("gateway_request_duration_seconds", "kind" => kind)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_attempt(call: &'static str, outcome: &'static str) {
    metrics::counter!(
        "gateway_upstream_attempts_total",
        "call" => call,
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_circuit_state(open: bool) {
    metrics::gauge!("gateway_circuit_open").set(if open { 1.0 } else { 0.0 });
}
