//! Gate metrics.
//!
//! # Metrics
//! - `gate_requests_rejected_total` (counter): rejections by reason
//!   (rate_limited, malformed_header, missing_permission, internal, ...)
//! - `gate_auth_outcomes_total` (counter): principal resolutions by
//!   outcome (anonymous, authenticated)

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(err) => tracing::error!(error = %err, "Failed to install metrics exporter"),
    }
}

/// Count a rejected request.
pub fn record_rejection(reason: &'static str) {
    metrics::counter!("gate_requests_rejected_total", "reason" => reason).increment(1);
}

/// Count an authentication resolution.
pub fn record_auth_outcome(outcome: &'static str) {
    metrics::counter!("gate_auth_outcomes_total", "outcome" => outcome).increment(1);
}
