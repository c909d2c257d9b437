//! Report rendering.
//!
//! Amounts are rendered as decimal strings; wei values do not fit JSON
//! numbers.

use alloy::primitives::U256;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::sweep::{BalanceReport, Outcome, SweepReport, TrailEntry};

/// Native currency decimals on every supported network.
pub const NATIVE_DECIMALS: u8 = 18;

/// Format `amount` in whole units with trailing zeros trimmed.
pub fn format_units(amount: U256, decimals: u8) -> String {
    if amount.is_zero() {
        return "0".to_string();
    }

    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = amount / divisor;
    let remainder = amount % divisor;

    if remainder.is_zero() {
        return whole.to_string();
    }
    let fraction = format!("{:0>width$}", remainder, width = decimals as usize);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

/// Serialized form of one sweep.
#[derive(Debug, Clone, Serialize)]
pub struct SweepRecord {
    pub sweep_id: String,
    pub network: String,
    pub chain_id: u64,
    pub address: String,
    pub outcome: &'static str,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_wei: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub trail: Vec<TrailEntry>,
}

impl From<&SweepReport> for SweepRecord {
    fn from(report: &SweepReport) -> Self {
        let (tx_hash, amount, error) = match &report.outcome {
            Outcome::Sent { tx_hash, amount } => (Some(tx_hash.to_string()), Some(*amount), None),
            Outcome::Planned { amount } => (None, Some(*amount), None),
            Outcome::AllEndpointsExhausted { last_amount } => (None, *last_amount, None),
            Outcome::ConfigurationError(detail) | Outcome::UnrecoverableError(detail) => {
                (None, None, Some(detail.clone()))
            }
            _ => (None, None, None),
        };

        Self {
            sweep_id: report.sweep_id.to_string(),
            network: report.network.clone(),
            chain_id: report.chain_id,
            address: report.address.to_string(),
            outcome: report.outcome.kind(),
            success: report.outcome.is_success(),
            tx_hash,
            amount_wei: amount.map(|a| a.to_string()),
            amount: amount.map(|a| format_units(a, NATIVE_DECIMALS)),
            symbol: report.currency_symbol.clone(),
            error,
            trail: report.trail.clone(),
        }
    }
}

/// Outcome counts across a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub by_outcome: BTreeMap<&'static str, usize>,
}

impl Summary {
    pub fn from_reports(reports: &[SweepReport]) -> Self {
        let mut summary = Summary::default();
        for report in reports {
            summary.total += 1;
            if report.outcome.is_success() {
                summary.succeeded += 1;
            } else {
                summary.failed += 1;
            }
            *summary.by_outcome.entry(report.outcome.kind()).or_insert(0) += 1;
        }
        summary
    }
}

/// Top-level sweep document.
#[derive(Debug, Clone, Serialize)]
pub struct SweepDocument {
    pub summary: Summary,
    pub sweeps: Vec<SweepRecord>,
}

impl SweepDocument {
    pub fn new(reports: &[SweepReport]) -> Self {
        Self {
            summary: Summary::from_reports(reports),
            sweeps: reports.iter().map(SweepRecord::from).collect(),
        }
    }
}

/// One row of the balance report.
#[derive(Debug, Clone, Serialize)]
pub struct BalanceRow {
    pub address: String,
    pub network: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_wei: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<String>,
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&BalanceReport> for BalanceRow {
    fn from(report: &BalanceReport) -> Self {
        let mut row = BalanceRow {
            address: report.address.to_string(),
            network: report.network.clone(),
            balance_wei: None,
            balance: None,
            symbol: report.currency_symbol.clone(),
            endpoint: None,
            error: None,
        };
        match &report.result {
            Ok((endpoint, balance)) => {
                row.balance_wei = Some(balance.to_string());
                row.balance = Some(format_units(*balance, NATIVE_DECIMALS));
                row.endpoint = Some(endpoint.clone());
            }
            Err(e) => row.error = Some(e.clone()),
        }
        row
    }
}

/// Write `value` as pretty JSON to `output`, or stdout when `None`.
pub fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> io::Result<()> {
    match output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.write_all(b"\n")?;
            writer.flush()
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.write_all(b"\n")?;
            writer.flush()
        }
    }
}
