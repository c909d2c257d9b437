//! Sweep engine.
//!
//! # Data Flow
//! ```text
//! run_batch (batch.rs)
//!     │  accounts × networks, bounded concurrency
//!     ▼
//! Sweeper::sweep (orchestrator.rs)
//!     │  deadline, sweep_id span
//!     ├─▶ connector::connect ──▶ chain ID + block probe, first healthy endpoint
//!     ├─▶ get_balance ─────────▶ zero → SkippedZeroBalance
//!     ├─▶ fees::estimate ──────▶ gas price × padded gas limit
//!     ├─▶ planner::plan ───────▶ balance - fee - margin, ≤ 0 → SkippedZeroPlan
//!     └─▶ Submission::run (machine.rs)
//!             decrement on insufficient funds, fail over on network errors
//!     ▼
//! SweepReport { outcome, trail }
//! ```
//!
//! # Design Decisions
//! - Sweeps share nothing mutable; each builds its own connections
//! - Every endpoint interaction lands in the trail, success or not
//! - Failure classification is a pure function of the error

pub mod batch;
pub mod classify;
pub mod connector;
pub mod fees;
pub mod machine;
pub mod orchestrator;
pub mod planner;
pub mod types;

pub use batch::{run_balances, run_batch};
pub use classify::{classify, FailureClass};
pub use orchestrator::{BalanceReport, Sweeper};
pub use types::{FeeQuote, FeeSource, Outcome, Stage, SweepPlan, SweepReport, TrailEntry};
