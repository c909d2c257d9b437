//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the sweeper.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::config::networks::builtin_networks;

/// Root configuration for the sweeper.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SweeperConfig {
    /// Sweep engine tuning (recipient, margins, retry budget).
    pub sweep: SweepConfig,

    /// Per-call RPC settings.
    pub rpc: RpcConfig,

    /// Batch scheduling.
    pub batch: BatchConfig,

    /// Where account keys are read from.
    pub wallets: WalletsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Networks to sweep. Falls back to the built-in testnet table.
    pub networks: Vec<NetworkProfile>,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            sweep: SweepConfig::default(),
            rpc: RpcConfig::default(),
            batch: BatchConfig::default(),
            wallets: WalletsConfig::default(),
            observability: ObservabilityConfig::default(),
            networks: builtin_networks(),
        }
    }
}

/// Sweep engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Address every sweep transfers to.
    pub recipient: String,

    /// Wei withheld from the transferable amount to absorb fee drift.
    pub safety_margin_wei: u64,

    /// Wei removed from the candidate amount after an insufficient-funds rejection.
    pub decrement_step_wei: u64,

    /// Submission attempts allowed on one endpoint before failing over.
    pub max_attempts_per_endpoint: u32,

    /// Proportional pad applied to an estimated gas limit (percent).
    pub gas_pad_percent: u64,

    /// Gas limit used when estimation fails (plain value transfer).
    pub fallback_gas_limit: u64,

    /// Hard upper bound on a single sweep, confirmation wait included.
    pub sweep_timeout_secs: u64,

    /// Base pause before moving to the next endpoint.
    pub failover_delay_ms: u64,

    /// Stop after planning, never submit.
    pub dry_run: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            recipient: String::new(),
            safety_margin_wei: 1_000,
            decrement_step_wei: 1_000,
            max_attempts_per_endpoint: 5,
            gas_pad_percent: 5,
            fallback_gas_limit: 21_000,
            sweep_timeout_secs: 300,
            failover_delay_ms: 250,
            dry_run: false,
        }
    }
}

/// RPC call configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Deadline for any single RPC request in seconds.
    pub timeout_secs: u64,

    /// Receipt polling interval in milliseconds.
    pub confirmation_poll_ms: u64,

    /// Block confirmations required before a transfer counts as sent.
    pub confirmations: u32,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            confirmation_poll_ms: 2_000,
            confirmations: 1,
        }
    }
}

/// Batch scheduling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Maximum sweeps in flight at once.
    pub concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { concurrency: 4 }
    }
}

/// Key source configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletsConfig {
    /// File holding one hex private key per line.
    pub keys_file: String,

    /// Environment variable holding comma-separated keys.
    pub keys_env: String,
}

impl Default for WalletsConfig {
    fn default() -> Self {
        Self {
            keys_file: "wallets.txt".to_string(),
            keys_env: "SWEEPER_PRIVATE_KEYS".to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log formatter.
    pub log_format: LogFormat,

    /// Default level for this crate when `RUST_LOG` is unset.
    pub log_level: String,

    /// Expose Prometheus metrics.
    pub metrics_enabled: bool,

    /// Metrics listener address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9100".to_string(),
        }
    }
}

/// Immutable description of one network and its candidate endpoints.
///
/// `rpc_urls` is in priority order; that order is also the failover order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NetworkProfile {
    /// Display name, also used for `--network` filtering.
    pub name: String,

    /// EIP-155 chain ID the endpoints must report.
    pub chain_id: u64,

    /// Native currency symbol (ETH, AVAX, ...).
    pub currency_symbol: String,

    /// Block explorer base URL.
    #[serde(default)]
    pub explorer_url: Option<String>,

    /// Candidate JSON-RPC endpoints.
    pub rpc_urls: Vec<String>,
}

impl NetworkProfile {
    /// Explorer link for a transaction hash, when an explorer is known.
    pub fn tx_url(&self, tx_hash: &str) -> Option<String> {
        self.explorer_url
            .as_ref()
            .map(|base| format!("{}/tx/{}", base.trim_end_matches('/'), tx_hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_engine_constants() {
        let config = SweeperConfig::default();
        assert_eq!(config.sweep.safety_margin_wei, 1_000);
        assert_eq!(config.sweep.decrement_step_wei, 1_000);
        assert_eq!(config.sweep.max_attempts_per_endpoint, 5);
        assert_eq!(config.sweep.gas_pad_percent, 5);
        assert_eq!(config.sweep.fallback_gas_limit, 21_000);
        assert!(!config.networks.is_empty());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: SweeperConfig = toml::from_str(
            r#"
            [sweep]
            recipient = "0x000000000000000000000000000000000000dEaD"

            [[networks]]
            name = "Local"
            chain_id = 31337
            currency_symbol = "ETH"
            rpc_urls = ["http://localhost:8545"]
            "#,
        )
        .unwrap();

        assert_eq!(config.sweep.max_attempts_per_endpoint, 5);
        assert_eq!(config.rpc.timeout_secs, 10);
        assert_eq!(config.networks.len(), 1);
        assert_eq!(config.networks[0].explorer_url, None);
    }

    #[test]
    fn test_log_format_lowercase() {
        let config: ObservabilityConfig = toml::from_str(r#"log_format = "json""#).unwrap();
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_tx_url() {
        let profile = NetworkProfile {
            name: "Sepolia".into(),
            chain_id: 11155111,
            currency_symbol: "ETH".into(),
            explorer_url: Some("https://sepolia.etherscan.io/".into()),
            rpc_urls: vec!["https://rpc.sepolia.org".into()],
        };
        assert_eq!(
            profile.tx_url("0xabc").as_deref(),
            Some("https://sepolia.etherscan.io/tx/0xabc")
        );
    }
}
