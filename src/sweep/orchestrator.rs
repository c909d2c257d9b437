//! Sweep orchestration for one account on one network.

use alloy::primitives::{Address, U256};
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

use crate::blockchain::{Account, ClientFactory, NetworkProfile};
use crate::config::validation::{parse_recipient, validate_network};
use crate::config::SweepConfig;
use crate::observability::metrics;
use crate::sweep::classify::{classify, FailureClass};
use crate::sweep::connector::{self, Connection};
use crate::sweep::fees::{self, FeeParams};
use crate::sweep::machine::{RetryPolicy, Submission};
use crate::sweep::planner::plan;
use crate::sweep::types::{Outcome, Stage, SweepPlan, SweepReport, SweepTrail};

/// Native balance of one account on one network.
#[derive(Debug, Clone)]
pub struct BalanceReport {
    pub network: String,
    pub currency_symbol: String,
    pub address: Address,
    /// Endpoint that answered, with the balance it reported.
    pub result: Result<(String, U256), String>,
}

/// Runs sweeps. Holds no per-sweep state, so one instance serves a whole batch.
pub struct Sweeper {
    factory: Arc<dyn ClientFactory>,
    settings: SweepConfig,
}

impl Sweeper {
    pub fn new(factory: Arc<dyn ClientFactory>, settings: SweepConfig) -> Self {
        Self { factory, settings }
    }

    pub fn settings(&self) -> &SweepConfig {
        &self.settings
    }

    /// Sweep `account` on `profile`. Yields exactly one outcome.
    pub async fn sweep(&self, account: &Account, profile: &NetworkProfile) -> SweepReport {
        let sweep_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "sweep",
            sweep_id = %sweep_id,
            network = %profile.name,
            address = %account.address()
        );

        let mut trail = SweepTrail::new();
        let deadline = Duration::from_secs(self.settings.sweep_timeout_secs);

        let outcome = match tokio::time::timeout(deadline, self.run(account, profile, &mut trail))
            .instrument(span.clone())
            .await
        {
            Ok(outcome) => outcome,
            Err(_) => {
                span.in_scope(|| {
                    tracing::error!(timeout_secs = deadline.as_secs(), "Sweep abandoned after deadline")
                });
                Outcome::TimedOut
            }
        };

        span.in_scope(|| match &outcome {
            Outcome::Sent { tx_hash, amount } => {
                metrics::record_swept(&profile.name, *amount);
                tracing::info!(
                    tx_hash = %tx_hash,
                    amount = %amount,
                    explorer = %profile.tx_url(&tx_hash.to_string()).unwrap_or_default(),
                    "Sweep complete"
                )
            }
            other if other.is_success() => tracing::info!(outcome = other.kind(), "Sweep finished"),
            other => tracing::warn!(outcome = other.kind(), "Sweep failed"),
        });
        metrics::record_sweep_outcome(&profile.name, outcome.kind());

        SweepReport {
            sweep_id,
            network: profile.name.clone(),
            chain_id: profile.chain_id,
            currency_symbol: profile.currency_symbol.clone(),
            address: account.address(),
            outcome,
            trail: trail.into_entries(),
        }
    }

    async fn run(&self, account: &Account, profile: &NetworkProfile, trail: &mut SweepTrail) -> Outcome {
        let recipient = match parse_recipient(&self.settings.recipient) {
            Ok(address) => address,
            Err(e) => return Outcome::ConfigurationError(e.to_string()),
        };
        let problems = validate_network(profile);
        if !problems.is_empty() {
            let detail = problems
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            return Outcome::ConfigurationError(detail);
        }

        let (connection, balance) = match self.fetch_balance(account, profile, trail).await {
            Ok(found) => found,
            Err(outcome) => return outcome,
        };
        tracing::info!(
            balance = %balance,
            symbol = %profile.currency_symbol,
            "Balance fetched"
        );
        if balance.is_zero() {
            return Outcome::SkippedZeroBalance;
        }

        let fee_params = FeeParams::from(&self.settings);
        let quote = match fees::estimate(&connection, account.address(), recipient, &fee_params, trail).await {
            Ok(quote) => quote,
            Err(e) => return Outcome::UnrecoverableError(e.to_string()),
        };

        let margin = U256::from(self.settings.safety_margin_wei);
        let amount = match plan(balance, &quote, margin) {
            SweepPlan::ZeroBalance => return Outcome::SkippedZeroBalance,
            SweepPlan::NothingToSend { balance, required } => {
                tracing::info!(
                    balance = %balance,
                    required = %required,
                    "Balance does not cover fee and safety margin"
                );
                return Outcome::SkippedZeroPlan;
            }
            SweepPlan::Send { amount, cost } => {
                tracing::info!(amount = %amount, cost = %cost, "Sweep planned");
                amount
            }
        };

        if self.settings.dry_run {
            return Outcome::Planned { amount };
        }

        let submission = Submission {
            factory: self.factory.as_ref(),
            profile,
            account,
            recipient,
            fees: fee_params,
            policy: RetryPolicy::from(&self.settings),
            failover_delay_ms: self.settings.failover_delay_ms,
        };
        submission.run(connection, quote, amount, trail).await
    }

    /// Connect and read the balance, failing over on network-class errors.
    async fn fetch_balance(
        &self,
        account: &Account,
        profile: &NetworkProfile,
        trail: &mut SweepTrail,
    ) -> Result<(Connection, U256), Outcome> {
        let exhausted = || Outcome::AllEndpointsExhausted { last_amount: None };
        let mut connection = connector::connect(self.factory.as_ref(), profile, account, 0, trail)
            .await
            .map_err(|_| exhausted())?;

        loop {
            let client = connection.client();
            match client.get_balance(account.address()).await {
                Ok(balance) => {
                    trail.success(client.endpoint(), Stage::Balance, Some(balance.to_string()));
                    return Ok((connection, balance));
                }
                Err(e) => {
                    trail.failure(client.endpoint(), Stage::Balance, &e);
                    if classify(&e) != FailureClass::Network {
                        return Err(Outcome::UnrecoverableError(e.to_string()));
                    }
                    tracing::warn!(endpoint = %client.endpoint(), error = %e, "Balance query failed");
                    let next = connection.index() + 1;
                    connection = connector::connect(self.factory.as_ref(), profile, account, next, trail)
                        .await
                        .map_err(|_| exhausted())?;
                }
            }
        }
    }

    /// Read-only balance lookup used by the balance report.
    pub async fn balance(&self, account: &Account, profile: &NetworkProfile) -> BalanceReport {
        let mut trail = SweepTrail::new();
        let deadline = Duration::from_secs(self.settings.sweep_timeout_secs);

        let result = match tokio::time::timeout(deadline, self.fetch_balance(account, profile, &mut trail)).await {
            Ok(Ok((connection, balance))) => Ok((connection.endpoint().to_string(), balance)),
            Ok(Err(outcome)) => Err(match outcome {
                Outcome::UnrecoverableError(detail) => detail,
                other => other.kind().to_string(),
            }),
            Err(_) => Err(Outcome::TimedOut.kind().to_string()),
        };

        BalanceReport {
            network: profile.name.clone(),
            currency_symbol: profile.currency_symbol.clone(),
            address: account.address(),
            result,
        }
    }
}
