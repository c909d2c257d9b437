//! EVM account sweeper.
//!
//! Moves the native balance of every configured account to one recipient,
//! on every configured network.
//!
//! # Architecture Overview
//!
//! ```text
//!   wallets.txt / $SWEEPER_PRIVATE_KEYS        sweeper.toml / .env
//!              │                                      │
//!              ▼                                      ▼
//!        ┌──────────┐                          ┌────────────┐
//!        │ accounts │                          │   config   │
//!        └────┬─────┘                          └─────┬──────┘
//!             │          accounts × networks         │
//!             └──────────────────┬───────────────────┘
//!                                ▼
//!                       ┌─────────────────┐
//!                       │  sweep::batch   │  bounded concurrency, Ctrl-C
//!                       └────────┬────────┘
//!                                ▼
//!   ┌──────────────────────────────────────────────────────────────┐
//!   │ Sweeper::sweep (per account, per network, deadline-bounded)  │
//!   │  connector → balance → fees → planner → submission machine   │
//!   └───────────────────────────┬──────────────────────────────────┘
//!                               ▼
//!                     JSON report (stdout or --output)
//! ```

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use evm_sweeper::blockchain::wallet::load_accounts;
use evm_sweeper::blockchain::AlloyClientFactory;
use evm_sweeper::config::{prepare_config, read_config, LogFormat, NetworkProfile, SweeperConfig};
use evm_sweeper::lifecycle::{signals, Shutdown};
use evm_sweeper::observability::{logging, metrics};
use evm_sweeper::report::{write_json, BalanceRow, SweepDocument};
use evm_sweeper::sweep::{run_balances, run_batch, Sweeper};

#[derive(Parser)]
#[command(name = "evm-sweeper", version)]
#[command(about = "Sweep native balances from many accounts across EVM networks", long_about = None)]
struct Cli {
    /// Configuration file; built-in defaults apply when it does not exist.
    #[arg(short, long, default_value = "sweeper.toml")]
    config: PathBuf,

    /// Log level for this crate when RUST_LOG is unset.
    #[arg(long)]
    log_level: Option<String>,

    /// Log output format (pretty or json).
    #[arg(long, value_parser = parse_log_format)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sweep every account on every selected network
    Sweep {
        /// Restrict to these networks (repeatable)
        #[arg(short, long = "network")]
        networks: Vec<String>,

        /// Plan transfers without submitting them
        #[arg(long)]
        dry_run: bool,

        /// Write the JSON report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Report native balances without sending anything
    Balances {
        #[arg(short, long = "network")]
        networks: Vec<String>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the effective network table
    Networks,
}

fn parse_log_format(raw: &str) -> Result<LogFormat, String> {
    match raw.to_ascii_lowercase().as_str() {
        "pretty" => Ok(LogFormat::Pretty),
        "json" => Ok(LogFormat::Json),
        other => Err(format!("unknown log format '{}' (expected pretty or json)", other)),
    }
}

/// Keep only the named networks, case-insensitively. Empty selects all.
fn select_networks(
    networks: &[NetworkProfile],
    names: &[String],
) -> Result<Vec<NetworkProfile>, Box<dyn std::error::Error>> {
    if names.is_empty() {
        return Ok(networks.to_vec());
    }

    let mut selected = Vec::with_capacity(names.len());
    for name in names {
        let profile = networks
            .iter()
            .find(|n| n.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| format!("unknown network '{}'", name))?;
        selected.push(profile.clone());
    }
    Ok(selected)
}

fn read_or_default(path: &Path) -> Result<(SweeperConfig, bool), Box<dyn std::error::Error>> {
    if path.exists() {
        Ok((read_config(path)?, true))
    } else {
        Ok((SweeperConfig::default(), false))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let (mut config, from_file) = read_or_default(&cli.config)?;
    if let Some(level) = cli.log_level {
        config.observability.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.observability.log_format = format;
    }
    logging::init_logging(config.observability.log_format, &config.observability.log_level);

    tracing::info!("evm-sweeper v{} starting", env!("CARGO_PKG_VERSION"));
    if from_file {
        tracing::info!(path = %cli.config.display(), "Configuration file loaded");
    } else {
        tracing::info!(path = %cli.config.display(), "No configuration file, using defaults");
    }
    let config = prepare_config(config)?;

    match cli.command {
        Commands::Networks => {
            write_json(&config.networks, None)?;
        }
        Commands::Balances { networks, output } => {
            let profiles = select_networks(&config.networks, &networks)?;
            let accounts = load_accounts(&config.wallets)?;

            let factory = Arc::new(AlloyClientFactory::new(config.rpc.clone()));
            let sweeper = Sweeper::new(factory, config.sweep.clone());
            let reports =
                run_balances(&sweeper, &accounts, &profiles, config.batch.concurrency).await;

            let rows: Vec<BalanceRow> = reports.iter().map(BalanceRow::from).collect();
            write_json(&rows, output.as_deref())?;
        }
        Commands::Sweep {
            networks,
            dry_run,
            output,
        } => {
            let profiles = select_networks(&config.networks, &networks)?;
            let accounts = load_accounts(&config.wallets)?;

            if config.observability.metrics_enabled {
                match config.observability.metrics_address.parse() {
                    Ok(addr) => metrics::init_metrics(addr),
                    Err(_) => tracing::error!(
                        metrics_address = %config.observability.metrics_address,
                        "Failed to parse metrics address"
                    ),
                }
            }

            let mut settings = config.sweep.clone();
            settings.dry_run |= dry_run;
            if settings.dry_run {
                tracing::info!("Dry run: transfers will be planned, not submitted");
            }

            let shutdown = Shutdown::new();
            signals::spawn_ctrl_c_handler(shutdown.clone());

            let factory = Arc::new(AlloyClientFactory::new(config.rpc.clone()));
            let sweeper = Sweeper::new(factory, settings);
            let reports = run_batch(
                &sweeper,
                &accounts,
                &profiles,
                config.batch.concurrency,
                &shutdown,
            )
            .await;

            let document = SweepDocument::new(&reports);
            write_json(&document, output.as_deref())?;

            tracing::info!(
                total = document.summary.total,
                succeeded = document.summary.succeeded,
                failed = document.summary.failed,
                "Sweep batch complete"
            );
            if document.summary.failed > 0 {
                return Err(format!("{} of {} sweeps failed", document.summary.failed, document.summary.total).into());
            }
        }
    }

    Ok(())
}
