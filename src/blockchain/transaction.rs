//! Transfer building and confirmation monitoring.
//!
//! # Responsibilities
//! - Describe a native-value transfer independently of the RPC library
//! - Convert it into a legacy (fixed gas price) transaction request
//! - Poll for the receipt until the required depth is reached

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::Provider;
use alloy::rpc::types::TransactionRequest;
use std::time::Duration;
use tokio::time::{interval, timeout};

use crate::blockchain::types::{BlockchainError, BlockchainResult, ConfirmationStatus};

/// A native-currency transfer with optional fixed fee parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub gas_price: Option<u128>,
    pub gas_limit: Option<u64>,
}

impl TransferRequest {
    /// Zero-value template used for gas estimation.
    pub fn template(from: Address, to: Address, gas_price: u128) -> Self {
        Self {
            from,
            to,
            value: U256::ZERO,
            gas_price: Some(gas_price),
            gas_limit: None,
        }
    }

    /// Fully priced transfer ready for submission.
    pub fn priced(from: Address, to: Address, value: U256, gas_price: u128, gas_limit: u64) -> Self {
        Self {
            from,
            to,
            value,
            gas_price: Some(gas_price),
            gas_limit: Some(gas_limit),
        }
    }

    /// Build the alloy request. Nonce is left to the provider's filler.
    pub fn to_request(&self, chain_id: u64) -> TransactionRequest {
        let mut tx = TransactionRequest::default()
            .with_from(self.from)
            .with_to(self.to)
            .with_value(self.value)
            .with_chain_id(chain_id);

        if let Some(gas_price) = self.gas_price {
            tx = tx.with_gas_price(gas_price);
        }
        if let Some(gas_limit) = self.gas_limit {
            tx = tx.with_gas_limit(gas_limit);
        }
        tx
    }
}

/// Wait for a transaction to reach `required_confirmations`.
///
/// Polls until the receipt is deep enough. Each poll is bounded by
/// `call_timeout`; the overall wait is bounded by the caller's sweep deadline.
pub async fn wait_for_confirmation(
    provider: &(dyn Provider + Send + Sync),
    tx_hash: TxHash,
    required_confirmations: u32,
    poll_interval: Duration,
    call_timeout: Duration,
) -> BlockchainResult<ConfirmationStatus> {
    let mut ticker = interval(poll_interval);
    let timeout_secs = call_timeout.as_secs();

    loop {
        ticker.tick().await;

        let receipt = match timeout(call_timeout, provider.get_transaction_receipt(tx_hash)).await {
            Ok(result) => result?,
            Err(_) => return Err(BlockchainError::Timeout(timeout_secs)),
        };
        let receipt = match receipt {
            Some(r) => r,
            None => {
                tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                continue;
            }
        };

        if !receipt.status() {
            return Ok(ConfirmationStatus::Failed(
                "Transaction reverted".to_string(),
            ));
        }

        let current_block = match timeout(call_timeout, provider.get_block_number()).await {
            Ok(result) => result?,
            Err(_) => return Err(BlockchainError::Timeout(timeout_secs)),
        };
        let tx_block = receipt.block_number.unwrap_or(current_block);
        let confirmations = confirmation_depth(current_block, tx_block);

        if confirmations >= required_confirmations {
            return Ok(ConfirmationStatus::Confirmed {
                block_number: tx_block,
            });
        }

        tracing::debug!(
            tx_hash = %tx_hash,
            confirmations = confirmations,
            required = required_confirmations,
            "Waiting for confirmations"
        );
    }
}

/// Number of blocks including the one the transaction landed in.
fn confirmation_depth(current_block: u64, tx_block: u64) -> u32 {
    let depth = current_block.saturating_sub(tx_block).saturating_add(1);
    u32::try_from(depth).unwrap_or(u32::MAX)
}
