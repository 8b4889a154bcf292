//! Prometheus metrics for the product API.
//!
//! Metrics are exposed on a dedicated HTTP listener when `METRICS_PORT` is
//! non-zero. Recording functions are always safe to call; without an
//! installed recorder they are no-ops.
//!
//! # Available Metrics
//!
//! ## Counters
//! - `product_api_http_requests_total` - Requests served (labels: endpoint, method, status)
//! - `product_api_auth_failures_total` - Requests rejected by the API key check (labels: reason)
//! - `product_api_product_mutations_total` - Successful writes (labels: operation)
//!
//! ## Histograms
//! - `product_api_request_duration_seconds` - Request duration (labels: endpoint, method, status)
//!
//! # Usage
//!
//! ```rust,ignore
//! use product_api::metrics::{init_metrics, record_product_mutation};
//!
//! init_metrics("0.0.0.0:9090".parse()?)?;
//! record_product_mutation("create");
//! ```

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{error, info};

/// Metric names as constants for consistency.
pub mod names {
    pub const HTTP_REQUESTS_TOTAL: &str = "product_api_http_requests_total";
    pub const REQUEST_DURATION_SECONDS: &str = "product_api_request_duration_seconds";
    pub const AUTH_FAILURES_TOTAL: &str = "product_api_auth_failures_total";
    pub const PRODUCT_MUTATIONS_TOTAL: &str = "product_api_product_mutations_total";
}

/// Initialize the Prometheus metrics exporter.
///
/// Installs the global recorder, starts the HTTP listener on
/// `metrics_addr` and registers metric descriptions.
pub fn init_metrics(metrics_addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))?;

    describe_counter!(
        names::HTTP_REQUESTS_TOTAL,
        "Total number of HTTP requests served"
    );
    describe_counter!(
        names::AUTH_FAILURES_TOTAL,
        "Total number of requests rejected for a missing or invalid API key"
    );
    describe_counter!(
        names::PRODUCT_MUTATIONS_TOTAL,
        "Total number of successful product writes"
    );
    describe_histogram!(
        names::REQUEST_DURATION_SECONDS,
        "HTTP request duration in seconds"
    );

    info!(addr = %metrics_addr, "Prometheus metrics endpoint started");
    Ok(())
}

/// Try to initialize metrics, logging any errors but not failing.
pub fn try_init_metrics(metrics_addr: SocketAddr) {
    if let Err(e) = init_metrics(metrics_addr) {
        error!(error = %e, "Failed to initialize metrics, continuing without metrics");
    }
}

/// Record one served request and its duration.
pub fn record_request(endpoint: &str, method: &str, status: &str, duration_secs: f64) {
    let labels = [
        ("endpoint", endpoint.to_string()),
        ("method", method.to_string()),
        ("status", status.to_string()),
    ];
    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a request rejected by the API key check.
pub fn record_auth_failure(reason: &'static str) {
    counter!(names::AUTH_FAILURES_TOTAL, "reason" => reason).increment(1);
}

/// Record a successful create, update or delete.
pub fn record_product_mutation(operation: &'static str) {
    counter!(names::PRODUCT_MUTATIONS_TOTAL, "operation" => operation).increment(1);
}
