//! Metrics collection and exposition.
//!
//! # Metrics
//! - `sweeper_sweeps_total` (counter): sweeps by network and outcome
//! - `sweeper_endpoint_attempts_total` (counter): connection probes by network and result
//! - `sweeper_submissions_total` (counter): submission attempts by network and result
//! - `sweeper_swept_wei_total` (counter): wei confirmed as sent, when it fits in u64
//!
//! Without an installed recorder every call is a no-op.

use alloy::primitives::U256;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus exporter on `addr`. Must run inside the Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Count a terminal sweep outcome.
pub fn record_sweep_outcome(network: &str, outcome: &'static str) {
    metrics::counter!(
        "sweeper_sweeps_total",
        "network" => network.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Count one endpoint connection probe.
pub fn record_endpoint_attempt(network: &str, reachable: bool) {
    let result = if reachable { "ok" } else { "failed" };
    metrics::counter!(
        "sweeper_endpoint_attempts_total",
        "network" => network.to_string(),
        "result" => result
    )
    .increment(1);
}

/// Count one submission attempt, labelled by failure class or `sent`.
pub fn record_submission(network: &str, result: &'static str) {
    metrics::counter!(
        "sweeper_submissions_total",
        "network" => network.to_string(),
        "result" => result
    )
    .increment(1);
}

/// Add a confirmed transfer amount.
pub fn record_swept(network: &str, amount: U256) {
    if amount <= U256::from(u64::MAX) {
        metrics::counter!("sweeper_swept_wei_total", "network" => network.to_string())
            .increment(amount.to::<u64>());
    }
}
