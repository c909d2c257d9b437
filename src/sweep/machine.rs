//! Submission retry state machine.
//!
//! # States
//! ```text
//! Sending ──ok──────────────────────────────▶ Succeeded
//!    │
//!    ├─ insufficient funds, budget left ────▶ Sending (amount - step)
//!    ├─ insufficient funds, budget spent ───▶ Failover
//!    ├─ network failure ────────────────────▶ Failover
//!    └─ anything else ──────────────────────▶ Aborted
//!
//! Failover ── next endpoint ──▶ Estimating ──▶ Sending (planned amount, fresh budget)
//!          └─ none left ──────▶ AllEndpointsExhausted
//! ```
//!
//! `AttemptState::on_failure` is the pure transition function; `Submission`
//! drives it against live connections.

use alloy::primitives::{Address, TxHash, U256};

use crate::blockchain::{
    Account, BlockchainError, ClientFactory, ConfirmationStatus, NetworkProfile, TransferRequest,
};
use crate::config::SweepConfig;
use crate::observability::metrics;
use crate::resilience::backoff::failover_delay;
use crate::sweep::classify::{classify, FailureClass};
use crate::sweep::connector::{self, Connection};
use crate::sweep::fees::{self, FeeParams};
use crate::sweep::types::{FeeQuote, Outcome, Stage, SweepTrail};

/// Decrement-and-retry budget per endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Wei removed after each insufficient-funds rejection.
    pub decrement_step: U256,
    /// Submissions allowed on one endpoint.
    pub max_attempts: u32,
}

impl From<&SweepConfig> for RetryPolicy {
    fn from(config: &SweepConfig) -> Self {
        Self {
            decrement_step: U256::from(config.decrement_step_wei),
            max_attempts: config.max_attempts_per_endpoint,
        }
    }
}

/// Attempt bookkeeping for the endpoint currently in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptState {
    /// Amount the next submission will carry.
    pub amount: U256,
    /// Index of the endpoint in the profile's list.
    pub endpoint_index: usize,
    /// Failed insufficient-funds submissions on this endpoint.
    pub attempts: u32,
}

/// What to do after a failed submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Submit again on the same connection.
    Retry(AttemptState),
    /// Leave the endpoint at `after`; `last_amount` is what was last attempted or due next.
    Failover { after: usize, last_amount: U256 },
    /// Stop the sweep.
    Abort,
}

impl AttemptState {
    /// Fresh budget on a newly obtained endpoint.
    pub fn fresh(amount: U256, endpoint_index: usize) -> Self {
        Self {
            amount,
            endpoint_index,
            attempts: 0,
        }
    }

    /// Next state after a failure of `class`.
    pub fn on_failure(&self, class: FailureClass, policy: &RetryPolicy) -> Transition {
        match class {
            FailureClass::InsufficientFunds => {
                let attempts = self.attempts.saturating_add(1);
                let amount = self.amount.saturating_sub(policy.decrement_step);
                if attempts >= policy.max_attempts || amount.is_zero() {
                    Transition::Failover {
                        after: self.endpoint_index,
                        last_amount: amount,
                    }
                } else {
                    Transition::Retry(AttemptState {
                        amount,
                        endpoint_index: self.endpoint_index,
                        attempts,
                    })
                }
            }
            FailureClass::Network => Transition::Failover {
                after: self.endpoint_index,
                last_amount: self.amount,
            },
            FailureClass::Unrecoverable => Transition::Abort,
        }
    }
}

/// Inputs shared by every step of one submission run.
pub struct Submission<'a> {
    pub factory: &'a dyn ClientFactory,
    pub profile: &'a NetworkProfile,
    pub account: &'a Account,
    pub recipient: Address,
    pub fees: FeeParams,
    pub policy: RetryPolicy,
    pub failover_delay_ms: u64,
}

impl Submission<'_> {
    /// Drive submissions until success, exhaustion or abort.
    ///
    /// `planned` is restored on every new endpoint; the decremented amount
    /// never carries over.
    pub async fn run(
        &self,
        mut connection: Connection,
        mut quote: FeeQuote,
        planned: U256,
        trail: &mut SweepTrail,
    ) -> Outcome {
        let mut state = AttemptState::fresh(planned, connection.index());
        let mut failovers = 0u32;

        loop {
            tracing::info!(
                endpoint = %connection.endpoint(),
                attempt = state.attempts + 1,
                amount = %state.amount,
                gas_price = quote.gas_price,
                gas_limit = quote.gas_limit,
                "Submitting transfer"
            );

            let error = match self.send_and_confirm(&connection, &state, &quote, trail).await {
                Ok(tx_hash) => {
                    metrics::record_submission(&self.profile.name, "sent");
                    return Outcome::Sent {
                        tx_hash,
                        amount: state.amount,
                    };
                }
                Err(e) => e,
            };

            let class = classify(&error);
            metrics::record_submission(&self.profile.name, class.label());

            match state.on_failure(class, &self.policy) {
                Transition::Retry(next) => {
                    tracing::warn!(
                        error = %error,
                        next_amount = %next.amount,
                        "Insufficient funds, lowering amount"
                    );
                    state = next;
                }
                Transition::Abort => {
                    tracing::error!(error = %error, "Unrecoverable submission error");
                    return Outcome::UnrecoverableError(error.to_string());
                }
                Transition::Failover { after, last_amount } => {
                    tracing::warn!(
                        endpoint = %connection.endpoint(),
                        error = %error,
                        class = class.label(),
                        "Abandoning endpoint"
                    );
                    failovers += 1;
                    tokio::time::sleep(failover_delay(failovers, self.failover_delay_ms)).await;

                    let next = match connector::connect(
                        self.factory,
                        self.profile,
                        self.account,
                        after + 1,
                        trail,
                    )
                    .await
                    {
                        Ok(next) => next,
                        Err(e) => {
                            tracing::error!(error = %e, last_amount = %last_amount, "No endpoint left");
                            return Outcome::AllEndpointsExhausted {
                                last_amount: Some(last_amount),
                            };
                        }
                    };

                    quote = match fees::estimate(
                        &next,
                        self.account.address(),
                        self.recipient,
                        &self.fees,
                        trail,
                    )
                    .await
                    {
                        Ok(q) => q,
                        Err(e) => return Outcome::UnrecoverableError(e.to_string()),
                    };
                    state = AttemptState::fresh(planned, next.index());
                    connection = next;
                }
            }
        }
    }

    async fn send_and_confirm(
        &self,
        connection: &Connection,
        state: &AttemptState,
        quote: &FeeQuote,
        trail: &mut SweepTrail,
    ) -> Result<TxHash, BlockchainError> {
        let client = connection.client();
        let tx = TransferRequest::priced(
            self.account.address(),
            self.recipient,
            state.amount,
            quote.gas_price,
            quote.gas_limit,
        );

        let tx_hash = match client.send_transfer(&tx).await {
            Ok(hash) => {
                tracing::info!(tx_hash = %hash, "Transaction broadcast");
                trail.success(
                    client.endpoint(),
                    Stage::Send,
                    Some(format!("{} wei, tx {}", state.amount, hash)),
                );
                hash
            }
            Err(e) => {
                trail.failure(client.endpoint(), Stage::Send, &e);
                return Err(e);
            }
        };

        let status = match client.wait_for_confirmation(tx_hash).await {
            Ok(status) => status,
            Err(e) => {
                // The broadcast may still be mined; keep its hash visible.
                tracing::warn!(tx_hash = %tx_hash, error = %e, "Confirmation failed after broadcast");
                trail.tx_failure(client.endpoint(), Stage::Confirm, tx_hash, &e);
                return Err(e);
            }
        };

        match status {
            ConfirmationStatus::Confirmed { block_number } => {
                tracing::info!(tx_hash = %tx_hash, block_number = block_number, "Transaction confirmed");
                trail.success(client.endpoint(), Stage::Confirm, Some(format!("block {}", block_number)));
                Ok(tx_hash)
            }
            ConfirmationStatus::Failed(reason) => {
                let e = BlockchainError::Reverted(format!("{} ({})", reason, tx_hash));
                trail.failure(client.endpoint(), Stage::Confirm, &e);
                Err(e)
            }
        }
    }
}
