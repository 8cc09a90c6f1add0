//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define API metrics (requests, latency, timeouts, internal errors, cache pings)
//! - Expose a Prometheus-compatible scrape endpoint when enabled
//!
//! # Metrics
//! - `api_requests_total` (counter): requests by method and status
//! - `api_request_duration_seconds` (histogram): latency distribution
//! - `api_timeouts_total` (counter): requests answered by the timeout guard
//! - `api_internal_errors_total` (counter): failures caught by normalization
//! - `api_cache_ping_total` (counter): cache pings by result
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Labels stay low-cardinality (no paths)

use std::net::SocketAddr;
use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener.
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record the outcome of one request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "api_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("api_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_timeout() {
    metrics::counter!("api_timeouts_total").increment(1);
}

pub fn record_internal_error() {
    metrics::counter!("api_internal_errors_total").increment(1);
}

pub fn record_cache_ping(healthy: bool) {
    let result = if healthy { "up" } else { "down" };
    metrics::counter!("api_cache_ping_total", "result" => result).increment(1);
}

/// Middleware that records every response, including 500s and 504s.
pub async fn track_requests(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let response = next.run(request).await;
    record_request(&method, response.status().as_u16(), start);
    response
}
