//! Sweep amount calculation.

use alloy::primitives::U256;

use crate::sweep::types::{FeeQuote, SweepPlan};

/// Size the transfer: `balance - gas_price * gas_limit - safety_margin`.
///
/// A zero balance short-circuits before any fee arithmetic. A result that
/// would be zero or negative is `NothingToSend`, a normal terminal state.
pub fn plan(balance: U256, quote: &FeeQuote, safety_margin: U256) -> SweepPlan {
    if balance.is_zero() {
        return SweepPlan::ZeroBalance;
    }

    let cost = quote.cost();
    let required = cost.saturating_add(safety_margin);

    match balance.checked_sub(required) {
        Some(amount) if !amount.is_zero() => SweepPlan::Send { amount, cost },
        _ => SweepPlan::NothingToSend { balance, required },
    }
}
