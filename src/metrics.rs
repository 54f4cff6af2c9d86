//! Prometheus metrics for upstream latency and failure tracking.
//!
//! Metrics are recorded through the `metrics` facade; nothing is exported
//! unless [`install_exporter`] is called at startup.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{debug, info};

// === Metric Name Constants ===

/// Upstream GraphQL request latency metric name.
pub const METRIC_UPSTREAM_LATENCY: &str = "upstream_request_latency_ms";
/// Upstream requests counter metric name.
pub const METRIC_UPSTREAM_REQUESTS: &str = "upstream_requests_total";
/// Upstream failures counter metric name.
pub const METRIC_UPSTREAM_ERRORS: &str = "upstream_errors_total";
/// Diagnostics checks counter metric name.
pub const METRIC_DIAGNOSTICS_CHECKS: &str = "diagnostics_checks_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_UPSTREAM_LATENCY,
        "W&B GraphQL request latency in milliseconds"
    );
    describe_counter!(
        METRIC_UPSTREAM_REQUESTS,
        "Total number of W&B GraphQL requests sent"
    );
    describe_counter!(
        METRIC_UPSTREAM_ERRORS,
        "Total number of failed W&B GraphQL requests by kind"
    );
    describe_counter!(
        METRIC_DIAGNOSTICS_CHECKS,
        "Total number of diagnostics reports produced"
    );

    debug!("Metrics initialized");
}

/// Start the Prometheus scrape endpoint on `addr`.
pub fn install_exporter(addr: SocketAddr) -> anyhow::Result<()> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    info!(%addr, "Prometheus exporter listening");
    Ok(())
}

/// Increment upstream request counter.
pub fn inc_upstream_requests(operation: &'static str) {
    counter!(METRIC_UPSTREAM_REQUESTS, "operation" => operation).increment(1);
}

/// Increment upstream error counter.
pub fn inc_upstream_errors(operation: &'static str, kind: &'static str) {
    counter!(METRIC_UPSTREAM_ERRORS, "operation" => operation, "kind" => kind).increment(1);
}

/// Increment diagnostics counter.
pub fn inc_diagnostics_checks() {
    counter!(METRIC_DIAGNOSTICS_CHECKS).increment(1);
}

/// RAII guard for timing operations.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    metric_name: &'static str,
    operation: &'static str,
}

impl LatencyTimer {
    /// Create a new latency timer for the given metric and operation label.
    pub fn new(metric_name: &'static str, operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            metric_name,
            operation,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        let latency_ms = self.elapsed_ms();
        histogram!(self.metric_name, "operation" => self.operation).record(latency_ms);
    }
}

/// Create a latency timer for an upstream call.
pub fn timer_upstream(operation: &'static str) -> LatencyTimer {
    LatencyTimer::new(METRIC_UPSTREAM_LATENCY, operation)
}
