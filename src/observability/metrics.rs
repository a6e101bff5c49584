//! Metrics collection and exposition.
//!
//! # Metrics
//! - `pion_dispatch_total` (counter): dispatch cycles by method, status
//! - `pion_dispatch_duration_seconds` (histogram): cycle latency by method
//! - `pion_views_rendered_total` (counter): rendered templates by extension
//! - `pion_double_respond_total` (counter): rejected second responses
//!
//! Without an installed recorder every call is a no-op, so the library
//! records unconditionally and only the binary decides whether to export.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(metrics_address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics recorder"),
    }
}

/// Record one finished dispatch cycle.
pub fn record_dispatch(method: &str, status: u16, start: Instant) {
    let method = method.to_string();
    metrics::counter!(
        "pion_dispatch_total",
        "method" => method.clone(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("pion_dispatch_duration_seconds", "method" => method)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_view_render(extension: &str) {
    metrics::counter!("pion_views_rendered_total", "extension" => extension.to_string())
        .increment(1);
}

pub fn record_double_respond() {
    metrics::counter!("pion_double_respond_total").increment(1);
}
