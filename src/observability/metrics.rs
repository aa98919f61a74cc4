//! Metrics collection and exposition.
//!
//! # Metrics
//! - `jar_requests_total` (counter): HTTP requests by method, status
//! - `jar_request_duration_seconds` (histogram): handler latency
//! - `jar_actions_total` (counter): jar mutations by action, outcome
//! - `jar_store_events_total` (counter): connection lifecycle events
//!
//! Recording is a no-op until a recorder is installed, so tests and
//! deployments without the exporter pay nothing.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "jar_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("jar_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_jar_action(action: &'static str, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    metrics::counter!("jar_actions_total", "action" => action, "outcome" => outcome).increment(1);
}

pub fn record_store_event(event: &'static str) {
    metrics::counter!("jar_store_events_total", "event" => event).increment(1);
}
