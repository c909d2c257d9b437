//! Structured logging.
//!
//! `RUST_LOG` wins over the configured level. JSON output is meant for log
//! shippers, pretty output for terminals. Logs go to stderr; stdout carries
//! reports.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogFormat;

/// Default filter directive for this crate at `level`.
pub fn default_directive(level: &str) -> String {
    format!("evm_sweeper={},alloy=warn", level)
}

/// Install the global subscriber. Call once, before any sweep starts.
pub fn init_logging(format: LogFormat, level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directive(level).into());

    let json = format == LogFormat::Json;
    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}
