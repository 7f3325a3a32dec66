//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define edge metrics (requests, latency, cache size, failures)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `edge_requests_total` (counter): requests by pipeline stage and status
//! - `edge_request_duration_seconds` (histogram): latency by pipeline stage
//! - `edge_cache_entries` (gauge): entries held by the memory cache
//! - `edge_origin_errors_total` (counter): failed origin fetches
//! - `edge_config_reloads_total` (counter): reload attempts by result
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Labels stay low-cardinality: stage names and status codes, never paths

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and start its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one handled request.
pub fn record_request(stage: &'static str, status: u16, start: Instant) {
    let status = status.to_string();
    counter!("edge_requests_total", "stage" => stage, "status" => status).increment(1);
    histogram!("edge_request_duration_seconds", "stage" => stage)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_cache_size(entries: usize) {
    gauge!("edge_cache_entries").set(entries as f64);
}

pub fn record_origin_error() {
    counter!("edge_origin_errors_total").increment(1);
}

pub fn record_config_reload(success: bool) {
    let result = if success { "success" } else { "failure" };
    counter!("edge_config_reloads_total", "result" => result).increment(1);
}
