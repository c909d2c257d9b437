//! Configuration validation.
//!
//! Serde handles syntax; this module checks meaning. Every problem is
//! collected so a bad config file is fixed in one pass.

use std::collections::HashSet;
use std::net::SocketAddr;

use alloy::primitives::Address;
use thiserror::Error;

use crate::config::schema::{NetworkProfile, SweeperConfig};

/// Placeholder shipped in sample configs; never a real destination.
const RECIPIENT_PLACEHOLDER: &str = "0xYourRecipientAddressHere";

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no networks configured")]
    NoNetworks,

    #[error("network '{0}' has no RPC URLs")]
    NoEndpoints(String),

    #[error("network '{0}' has chain_id 0")]
    ZeroChainId(String),

    #[error("network '{network}' has invalid RPC URL '{url}'")]
    InvalidEndpoint { network: String, url: String },

    #[error("network '{0}' is defined more than once")]
    DuplicateNetwork(String),

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error("invalid metrics address '{0}'")]
    InvalidMetricsAddress(String),

    #[error("recipient address is not set")]
    MissingRecipient,

    #[error("recipient address '{0}' is not a valid address")]
    InvalidRecipient(String),
}

/// Validate the whole configuration.
pub fn validate_config(config: &SweeperConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.networks.is_empty() {
        errors.push(ValidationError::NoNetworks);
    }

    let mut seen = HashSet::new();
    for network in &config.networks {
        if !seen.insert(network.name.as_str()) {
            errors.push(ValidationError::DuplicateNetwork(network.name.clone()));
        }
        errors.extend(validate_network(network));
    }

    if config.batch.concurrency == 0 {
        errors.push(ValidationError::ZeroValue("batch.concurrency"));
    }
    if config.sweep.max_attempts_per_endpoint == 0 {
        errors.push(ValidationError::ZeroValue("sweep.max_attempts_per_endpoint"));
    }
    if config.sweep.fallback_gas_limit == 0 {
        errors.push(ValidationError::ZeroValue("sweep.fallback_gas_limit"));
    }
    if config.sweep.sweep_timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue("sweep.sweep_timeout_secs"));
    }
    if config.rpc.timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue("rpc.timeout_secs"));
    }
    if config.rpc.confirmations == 0 {
        errors.push(ValidationError::ZeroValue("rpc.confirmations"));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check the invariants of a single network profile.
pub fn validate_network(network: &NetworkProfile) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if network.chain_id == 0 {
        errors.push(ValidationError::ZeroChainId(network.name.clone()));
    }
    if network.rpc_urls.is_empty() {
        errors.push(ValidationError::NoEndpoints(network.name.clone()));
    }
    for url in &network.rpc_urls {
        let valid = url::Url::parse(url)
            .map(|u| matches!(u.scheme(), "http" | "https"))
            .unwrap_or(false);
        if !valid {
            errors.push(ValidationError::InvalidEndpoint {
                network: network.name.clone(),
                url: url.clone(),
            });
        }
    }

    errors
}

/// Parse the sweep destination, rejecting blanks, placeholders and the zero address.
pub fn parse_recipient(raw: &str) -> Result<Address, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == RECIPIENT_PLACEHOLDER {
        return Err(ValidationError::MissingRecipient);
    }

    let address: Address = trimmed
        .parse()
        .map_err(|_| ValidationError::InvalidRecipient(trimmed.to_string()))?;
    if address == Address::ZERO {
        return Err(ValidationError::InvalidRecipient(trimmed.to_string()));
    }
    Ok(address)
}
