//! Bounded concurrent batch over accounts × networks.

use futures_util::stream::{self, StreamExt};
use uuid::Uuid;

use crate::blockchain::{Account, NetworkProfile};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::sweep::orchestrator::{BalanceReport, Sweeper};
use crate::sweep::types::{Outcome, SweepReport};

/// One (account, network) pair, in dispatch order.
struct Job<'a> {
    index: usize,
    account: &'a Account,
    profile: &'a NetworkProfile,
}

fn jobs<'a>(accounts: &'a [Account], profiles: &'a [NetworkProfile]) -> Vec<Job<'a>> {
    accounts
        .iter()
        .flat_map(move |account| profiles.iter().map(move |profile| (account, profile)))
        .enumerate()
        .map(|(index, (account, profile))| Job {
            index,
            account,
            profile,
        })
        .collect()
}

fn cancelled(account: &Account, profile: &NetworkProfile) -> SweepReport {
    metrics::record_sweep_outcome(&profile.name, Outcome::Cancelled.kind());
    SweepReport {
        sweep_id: Uuid::new_v4(),
        network: profile.name.clone(),
        chain_id: profile.chain_id,
        currency_symbol: profile.currency_symbol.clone(),
        address: account.address(),
        outcome: Outcome::Cancelled,
        trail: Vec::new(),
    }
}

/// Sweep every account on every network with at most `concurrency` sweeps
/// in flight.
///
/// Sweeps never share mutable state, so one failing does not affect the
/// others. Once `shutdown` fires, sweeps not yet started report `Cancelled`.
/// Reports come back in dispatch order regardless of completion order.
pub async fn run_batch(
    sweeper: &Sweeper,
    accounts: &[Account],
    profiles: &[NetworkProfile],
    concurrency: usize,
    shutdown: &Shutdown,
) -> Vec<SweepReport> {
    let jobs = jobs(accounts, profiles);
    tracing::info!(
        sweeps = jobs.len(),
        accounts = accounts.len(),
        networks = profiles.len(),
        concurrency = concurrency,
        "Starting sweep batch"
    );

    let mut reports: Vec<(usize, SweepReport)> = stream::iter(jobs)
        .map(|job| async move {
            let report = if shutdown.is_triggered() {
                cancelled(job.account, job.profile)
            } else {
                sweeper.sweep(job.account, job.profile).await
            };
            (job.index, report)
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    reports.sort_by_key(|(index, _)| *index);
    reports.into_iter().map(|(_, report)| report).collect()
}

/// Read balances for every account on every network, `concurrency` at a time.
pub async fn run_balances(
    sweeper: &Sweeper,
    accounts: &[Account],
    profiles: &[NetworkProfile],
    concurrency: usize,
) -> Vec<BalanceReport> {
    let mut reports: Vec<(usize, BalanceReport)> = stream::iter(jobs(accounts, profiles))
        .map(|job| async move { (job.index, sweeper.balance(job.account, job.profile).await) })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    reports.sort_by_key(|(index, _)| *index);
    reports.into_iter().map(|(_, report)| report).collect()
}
