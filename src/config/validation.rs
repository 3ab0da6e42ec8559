//! Semantic configuration checks (serde handles the syntax).

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::GateConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("listener.bind_address is not a valid socket address: {0}")]
    BadBindAddress(String),

    #[error("rate_limit.requests_per_second must be positive when the limiter is enabled")]
    NonPositiveRate,

    #[error("rate_limit.burst must be at least 1 when the limiter is enabled")]
    ZeroBurst,

    #[error("eviction.sweep_interval_secs must be positive")]
    ZeroSweepInterval,

    #[error("eviction.idle_threshold_secs must be at least the sweep interval")]
    IdleBelowSweep,

    #[error("timeouts.external_call_secs must be positive")]
    ZeroExternalTimeout,

    #[error("observability.metrics_address is not a valid socket address: {0}")]
    BadMetricsAddress(String),
}

/// Check the whole config and report every problem, not just the first.
pub fn validate_config(config: &GateConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BadBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.rate_limit.enabled {
        if config.rate_limit.requests_per_second <= 0.0 {
            errors.push(ValidationError::NonPositiveRate);
        }
        if config.rate_limit.burst == 0 {
            errors.push(ValidationError::ZeroBurst);
        }
    }

    if config.eviction.sweep_interval_secs == 0 {
        errors.push(ValidationError::ZeroSweepInterval);
    } else if config.eviction.idle_threshold_secs < config.eviction.sweep_interval_secs {
        errors.push(ValidationError::IdleBelowSweep);
    }

    if config.timeouts.external_call_secs == 0 {
        errors.push(ValidationError::ZeroExternalTimeout);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::BadMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
