//! Metrics collection and exposition.
//!
//! # Metrics
//! - `ssr_render_total` (counter): render stage outcomes by `outcome`
//!   (`rendered`, `redirect`, `response`, `preload_error`, `render_error`,
//!   `encode_error`)
//! - `ssr_render_duration_seconds` (histogram): time spent in the render stage
//! - `ssr_request_failures_total` (counter): errors recovered by the catch
//!   stage, by `kind`
//!
//! Recording is a no-op until a recorder is installed, so library users that
//! never call [`init_metrics`] pay nothing beyond the facade lookup.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_render(outcome: &str, start: Instant) {
    ::metrics::counter!("ssr_render_total", "outcome" => outcome.to_owned()).increment(1);
    ::metrics::histogram!("ssr_render_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_failure(kind: &str) {
    ::metrics::counter!("ssr_request_failures_total", "kind" => kind.to_owned()).increment(1);
}
