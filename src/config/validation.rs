//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals > 0, retry budget >= 1)
//! - Check URLs, paths and addresses are usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: WatchdogConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::WatchdogConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("monitor.max_retries must be at least 1")]
    ZeroRetryBudget,

    #[error("monitor.{0} must be greater than 0")]
    ZeroInterval(&'static str),

    #[error("node.api_base_url is not a valid http(s) URL: {0}")]
    InvalidBaseUrl(String),

    #[error("node.{field} must start with '/': {value}")]
    RelativeEndpointPath { field: &'static str, value: String },

    #[error("node.consensus_subdir must be a non-empty relative path")]
    InvalidConsensusSubdir,

    #[error("observability.metrics_address is not a socket address: {0}")]
    InvalidMetricsAddress(String),

    #[error("auth.server_identity_value is set but auth.server_identity_key is blank")]
    IdentityValueWithoutKey,
}

/// Validate a parsed configuration, collecting every error.
pub fn validate_config(config: &WatchdogConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let monitor = &config.monitor;
    if monitor.max_retries == 0 {
        errors.push(ValidationError::ZeroRetryBudget);
    }
    for (field, value) in [
        ("probe_interval_ms", monitor.probe_interval_ms),
        ("readiness_poll_ms", monitor.readiness_poll_ms),
        ("request_timeout_ms", monitor.request_timeout_ms),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroInterval(field));
        }
    }

    let node = &config.node;
    match Url::parse(&node.api_base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
        _ => errors.push(ValidationError::InvalidBaseUrl(node.api_base_url.clone())),
    }
    if !node.instance_path.starts_with('/') {
        errors.push(ValidationError::RelativeEndpointPath {
            field: "instance_path",
            value: node.instance_path.clone(),
        });
    }
    if let Some(path) = &node.readiness_path {
        if !path.starts_with('/') {
            errors.push(ValidationError::RelativeEndpointPath {
                field: "readiness_path",
                value: path.clone(),
            });
        }
    }
    if node.consensus_subdir.as_os_str().is_empty() || node.consensus_subdir.is_absolute() {
        errors.push(ValidationError::InvalidConsensusSubdir);
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    if config.auth.identity_header().is_none() && !config.auth.server_identity_value.is_empty() {
        errors.push(ValidationError::IdentityValueWithoutKey);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
