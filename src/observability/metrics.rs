//! Metrics collection and exposition.
//!
//! # Metrics
//! - `pos_requests_total` (counter): requests by method, path, status
//! - `pos_request_duration_seconds` (histogram): latency distribution

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and spawn its scrape endpoint.
///
/// Failure to install is logged and the server keeps running without
/// metrics; losing a scrape target is not worth refusing to serve.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe_counter!("pos_requests_total", "Total HTTP requests served");
            describe_histogram!(
                "pos_request_duration_seconds",
                "HTTP request latency in seconds"
            );
            tracing::info!(address = %addr, "Metrics exporter listening");
        }
        Err(error) => {
            tracing::error!(error = %error, "Failed to install metrics exporter");
        }
    }
}

/// Record one served request.
pub fn record_request(method: &str, path: &str, status: u16, start: Instant) {
    counter!(
        "pos_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "pos_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}
