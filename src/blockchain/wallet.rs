//! Account loading.
//!
//! # Security
//! - Keys come from a local file or an environment variable
//! - Keys are never logged or serialized; only a short prefix of a
//!   rejected line is shown

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use std::collections::HashSet;
use std::path::Path;

use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::config::WalletsConfig;

/// A sweepable account: address plus signing capability.
#[derive(Clone)]
pub struct Account {
    signer: PrivateKeySigner,
}

impl Account {
    /// Create an account from a hex-encoded private key string.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    pub fn from_private_key(private_key_hex: &str) -> BlockchainResult<Self> {
        let key_hex = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| BlockchainError::Wallet(format!("Invalid private key format: {}", e)))?;

        Ok(Self { signer })
    }

    /// Get the account's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Signing key, handed to the chain client only.
    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.address())
            .finish()
    }
}

/// Whether a line looks like a raw secp256k1 key: 64 hex digits, optional 0x.
pub fn is_valid_key_format(candidate: &str) -> bool {
    let hex = candidate.strip_prefix("0x").unwrap_or(candidate);
    hex.len() == 64 && hex.chars().all(|c| c.is_ascii_hexdigit())
}

/// Parse keys from text: one per line or comma separated.
///
/// Blank lines and `#` comments are skipped, malformed keys are skipped
/// with a warning and duplicate addresses are dropped.
pub fn parse_accounts(text: &str) -> Vec<Account> {
    let mut seen = HashSet::new();
    let mut accounts = Vec::new();

    for raw in text.split(['\n', ',']) {
        let candidate = raw.trim();
        if candidate.is_empty() || candidate.starts_with('#') {
            continue;
        }
        if !is_valid_key_format(candidate) {
            tracing::warn!(
                prefix = %candidate.chars().take(6).collect::<String>(),
                "Skipping invalid private key format"
            );
            continue;
        }
        match Account::from_private_key(candidate) {
            Ok(account) => {
                if seen.insert(account.address()) {
                    accounts.push(account);
                } else {
                    tracing::debug!(address = %account.address(), "Skipping duplicate key");
                }
            }
            Err(e) => tracing::warn!(error = %e, "Skipping unusable private key"),
        }
    }

    accounts
}

/// Load every account from the configured key file and environment variable.
///
/// A missing key file is not an error as long as the environment supplies keys.
pub fn load_accounts(config: &WalletsConfig) -> BlockchainResult<Vec<Account>> {
    let mut text = String::new();

    let path = Path::new(&config.keys_file);
    match std::fs::read_to_string(path) {
        Ok(contents) => text.push_str(&contents),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "Key file not found");
        }
        Err(e) => {
            return Err(BlockchainError::Wallet(format!(
                "Failed to read key file {}: {}",
                path.display(),
                e
            )))
        }
    }

    if let Ok(from_env) = std::env::var(&config.keys_env) {
        text.push('\n');
        text.push_str(&from_env);
    }

    let accounts = parse_accounts(&text);
    if accounts.is_empty() {
        return Err(BlockchainError::Wallet(format!(
            "No valid private keys found in {} or ${}",
            config.keys_file, config.keys_env
        )));
    }

    tracing::info!(count = accounts.len(), "Accounts loaded");
    Ok(accounts)
}
