//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Sweeps produce:
//!     → logging.rs (structured events inside a per-sweep span)
//!     → metrics.rs (counters per network and outcome)
//!
//! Consumers:
//!     → stderr (pretty or JSON); stdout is left to reports
//!     → optional Prometheus scrape endpoint
//! ```
//!
//! # Design Decisions
//! - Every sweep runs in a span carrying `sweep_id`, `network` and `address`
//! - Private keys never reach a log field
//! - Metrics are cheap and no-ops unless the exporter is enabled

pub mod logging;
pub mod metrics;
