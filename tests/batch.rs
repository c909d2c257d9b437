//! Batch scheduling: concurrency bound, ordering, cancellation.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{account, profile, settings, MockFactory, Script, KEY_A, KEY_B};
use evm_sweeper::lifecycle::Shutdown;
use evm_sweeper::sweep::{run_balances, run_batch, Outcome, Sweeper};

fn slow(balance: u64) -> Script {
    Script {
        balance_delay: Duration::from_millis(100),
        ..Script::healthy(balance)
    }
}

#[tokio::test]
async fn test_concurrency_is_bounded_and_order_kept() {
    let factory = Arc::new(
        MockFactory::new()
            .with("http://one", slow(0))
            .with("http://two", slow(0))
            .with("http://three", slow(1_000_000)),
    );
    let networks = vec![
        profile("One", &["http://one"]),
        profile("Two", &["http://two"]),
        profile("Three", &["http://three"]),
    ];
    let accounts = vec![account(KEY_A), account(KEY_B)];
    let sweeper = Sweeper::new(factory.clone(), settings());

    let reports = run_batch(&sweeper, &accounts, &networks, 2, &Shutdown::new()).await;

    assert_eq!(reports.len(), 6);
    assert!(factory.peak_concurrency() <= 2);
    assert!(factory.peak_concurrency() >= 2);

    let order: Vec<(&str, _)> = reports
        .iter()
        .map(|r| (r.network.as_str(), r.address))
        .collect();
    assert_eq!(order[0], ("One", accounts[0].address()));
    assert_eq!(order[2], ("Three", accounts[0].address()));
    assert_eq!(order[3], ("One", accounts[1].address()));

    assert_eq!(reports[0].outcome, Outcome::SkippedZeroBalance);
    assert!(matches!(reports[2].outcome, Outcome::Sent { .. }));
    assert!(matches!(reports[5].outcome, Outcome::Sent { .. }));
}

#[tokio::test]
async fn test_one_failing_network_does_not_affect_others() {
    let factory = Arc::new(
        MockFactory::new()
            .with("http://down", Script::unreachable())
            .with("http://up", Script::healthy(1_000_000)),
    );
    let networks = vec![profile("Down", &["http://down"]), profile("Up", &["http://up"])];
    let sweeper = Sweeper::new(factory.clone(), settings());

    let reports = run_batch(&sweeper, &[account(KEY_A)], &networks, 4, &Shutdown::new()).await;

    assert_eq!(reports[0].outcome, Outcome::AllEndpointsExhausted { last_amount: None });
    assert!(matches!(reports[1].outcome, Outcome::Sent { .. }));
}

#[tokio::test]
async fn test_shutdown_before_start_cancels_everything() {
    let factory = Arc::new(MockFactory::new().with("http://a", Script::healthy(1_000_000)));
    let networks = vec![profile("A", &["http://a"])];
    let sweeper = Sweeper::new(factory.clone(), settings());
    let shutdown = Shutdown::new();
    shutdown.trigger();

    let reports = run_batch(&sweeper, &[account(KEY_A), account(KEY_B)], &networks, 2, &shutdown).await;

    assert!(reports.iter().all(|r| r.outcome == Outcome::Cancelled));
    assert!(factory.calls().is_empty());
}

#[tokio::test]
async fn test_shutdown_lets_running_sweep_finish() {
    let factory = Arc::new(MockFactory::new().with(
        "http://a",
        Script {
            balance_delay: Duration::from_millis(300),
            ..Script::healthy(0)
        },
    ));
    let networks = vec![profile("A", &["http://a"])];
    let accounts = vec![account(KEY_A), account(KEY_B)];
    let sweeper = Sweeper::new(factory.clone(), settings());
    let shutdown = Shutdown::new();

    let trigger = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.trigger();
    });

    let reports = run_batch(&sweeper, &accounts, &networks, 1, &shutdown).await;

    assert_eq!(reports[0].outcome, Outcome::SkippedZeroBalance);
    assert_eq!(reports[1].outcome, Outcome::Cancelled);
    assert_eq!(factory.count("balance"), 1);
}

#[tokio::test]
async fn test_balances_report_every_pair() {
    let factory = Arc::new(
        MockFactory::new()
            .with("http://a", Script::healthy(42))
            .with("http://down", Script::unreachable()),
    );
    let networks = vec![profile("A", &["http://a"]), profile("Down", &["http://down"])];
    let sweeper = Sweeper::new(factory.clone(), settings());

    let reports = run_balances(&sweeper, &[account(KEY_A)], &networks, 2).await;

    assert_eq!(reports.len(), 2);
    let (endpoint, balance) = reports[0].result.clone().unwrap();
    assert_eq!(endpoint, "http://a");
    assert_eq!(balance.to::<u64>(), 42);
    assert_eq!(reports[1].result, Err("all_endpoints_exhausted".to_string()));
    assert_eq!(factory.count("send"), 0);
}
