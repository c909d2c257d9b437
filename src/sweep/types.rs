//! Sweep engine data model.

use alloy::primitives::{Address, TxHash, U256};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::blockchain::BlockchainError;

/// Where a fee quote's gas limit came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeSource {
    /// `eth_estimateGas` result plus the safety pad.
    Estimated,
    /// Fixed plain-transfer gas cost, used unpadded.
    Fallback,
}

/// Price per gas unit and gas limit for one endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeQuote {
    /// Wei per gas unit.
    pub gas_price: u128,
    /// Gas units reserved for the transfer.
    pub gas_limit: u64,
    pub source: FeeSource,
}

impl FeeQuote {
    /// Total fee in wei, computed without loss of precision.
    pub fn cost(&self) -> U256 {
        U256::from(self.gas_price) * U256::from(self.gas_limit)
    }
}

/// Result of sizing a sweep against a known balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepPlan {
    /// Balance is zero; nothing was priced.
    ZeroBalance,
    /// Fee plus margin consumes the whole balance.
    NothingToSend { balance: U256, required: U256 },
    /// Transfer `amount`, paying at most `cost` in fees.
    Send { amount: U256, cost: U256 },
}

/// Terminal result of one sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Transfer confirmed on-chain.
    Sent { tx_hash: TxHash, amount: U256 },
    /// Dry run: the amount that would have been submitted.
    Planned { amount: U256 },
    SkippedZeroBalance,
    SkippedZeroPlan,
    /// Every endpoint was tried. `None` when none could even be connected.
    AllEndpointsExhausted { last_amount: Option<U256> },
    ConfigurationError(String),
    UnrecoverableError(String),
    /// The per-sweep deadline expired.
    TimedOut,
    /// Batch shut down before this sweep started.
    Cancelled,
}

impl Outcome {
    /// Stable label for logs, metrics and reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::Sent { .. } => "sent",
            Outcome::Planned { .. } => "planned",
            Outcome::SkippedZeroBalance => "skipped_zero_balance",
            Outcome::SkippedZeroPlan => "skipped_zero_plan",
            Outcome::AllEndpointsExhausted { .. } => "all_endpoints_exhausted",
            Outcome::ConfigurationError(_) => "configuration_error",
            Outcome::UnrecoverableError(_) => "unrecoverable_error",
            Outcome::TimedOut => "timed_out",
            Outcome::Cancelled => "cancelled",
        }
    }

    /// Whether the sweep ended without anything going wrong.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            Outcome::Sent { .. }
                | Outcome::Planned { .. }
                | Outcome::SkippedZeroBalance
                | Outcome::SkippedZeroPlan
        )
    }
}

/// Errors that end a sweep stage before submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SweepError {
    #[error("No reachable endpoint for {network} (tried {tried})")]
    NoReachableEndpoint { network: String, tried: usize },

    #[error("Gas price unavailable: {0}")]
    GasPriceUnavailable(String),
}

/// Step of the sweep an endpoint interaction belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Connect,
    Balance,
    GasPrice,
    EstimateGas,
    Send,
    Confirm,
}

/// One endpoint interaction and its result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrailEntry {
    pub endpoint: String,
    pub stage: Stage,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Ordered diagnostic trail of a sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepTrail {
    entries: Vec<TrailEntry>,
}

impl SweepTrail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&mut self, endpoint: &str, stage: Stage, detail: Option<String>) {
        self.entries.push(TrailEntry {
            endpoint: endpoint.to_string(),
            stage,
            ok: true,
            detail,
        });
    }

    pub fn failure(&mut self, endpoint: &str, stage: Stage, error: &BlockchainError) {
        self.entries.push(TrailEntry {
            endpoint: endpoint.to_string(),
            stage,
            ok: false,
            detail: Some(error.to_string()),
        });
    }

    /// Failure of a step tied to an already broadcast transaction.
    pub fn tx_failure(&mut self, endpoint: &str, stage: Stage, tx_hash: TxHash, error: &BlockchainError) {
        self.entries.push(TrailEntry {
            endpoint: endpoint.to_string(),
            stage,
            ok: false,
            detail: Some(format!("tx {}: {}", tx_hash, error)),
        });
    }

    pub fn entries(&self) -> &[TrailEntry] {
        &self.entries
    }

    /// Entries for one stage, in order.
    pub fn stage(&self, stage: Stage) -> impl Iterator<Item = &TrailEntry> {
        self.entries.iter().filter(move |e| e.stage == stage)
    }

    pub fn into_entries(self) -> Vec<TrailEntry> {
        self.entries
    }
}

/// Everything a caller learns about one sweep.
#[derive(Debug, Clone)]
pub struct SweepReport {
    pub sweep_id: Uuid,
    pub network: String,
    pub chain_id: u64,
    pub currency_symbol: String,
    pub address: Address,
    pub outcome: Outcome,
    pub trail: Vec<TrailEntry>,
}
