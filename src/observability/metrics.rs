//! Metrics collection and exposition.
//!
//! # Metrics
//! - `watchdog_probe_attempts_total` (counter): probe attempts by `outcome`
//! - `watchdog_cleanup_failures_total` (counter): failed marker deletions
//! - `watchdog_recoveries_total` (counter): consensus directory wipes
//!
//! Recording is a no-op until a recorder is installed, so library users
//! who never call [`init_metrics`] pay nothing.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::watchdog::probe::ProbeOutcome;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(
            address = %addr,
            error = %e,
            "Failed to install metrics exporter"
        ),
    }
}

pub fn record_probe(outcome: ProbeOutcome) {
    metrics::counter!("watchdog_probe_attempts_total", "outcome" => outcome.as_str()).increment(1);
}

pub fn record_cleanup_failure() {
    metrics::counter!("watchdog_cleanup_failures_total").increment(1);
}

pub fn record_recovery() {
    metrics::counter!("watchdog_recoveries_total").increment(1);
}
