//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger (latched) → queued sweeps report Cancelled → batch returns
//! ```
//!
//! # Design Decisions
//! - A submitted transaction is never abandoned by a signal
//! - Sweep deadlines bound how long shutdown can take

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
