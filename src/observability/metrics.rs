//! Metrics collection and exposition.
//!
//! # Metrics
//! - `tagserve_requests_total` (counter, by status): dispatched requests
//! - `tagserve_cache_hits_total` / `tagserve_cache_misses_total` (counters)
//! - `tagserve_rebuilds_total` (counter, by outcome)
//! - `tagserve_versions_serving` (gauge): versions in the installed table

use std::net::SocketAddr;

use axum::http::StatusCode;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exporter. Failure to bind is logged, not fatal.
pub fn init(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "metrics exporter listening"),
        Err(err) => {
            tracing::error!(address = %addr, error = %err, "failed to start metrics exporter");
        }
    }
}

pub fn record_request(status: StatusCode) {
    metrics::counter!("tagserve_requests_total", "status" => status.as_u16().to_string())
        .increment(1);
}

pub fn record_cache_hit() {
    metrics::counter!("tagserve_cache_hits_total").increment(1);
}

pub fn record_cache_miss() {
    metrics::counter!("tagserve_cache_misses_total").increment(1);
}

pub fn record_rebuild(outcome: &'static str) {
    metrics::counter!("tagserve_rebuilds_total", "outcome" => outcome).increment(1);
}

pub fn set_versions_serving(count: usize) {
    metrics::gauge!("tagserve_versions_serving").set(count as f64);
}
