//! Multi-network EVM account sweeper library.

pub mod blockchain;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod report;
pub mod resilience;
pub mod sweep;

pub use config::schema::SweeperConfig;
pub use lifecycle::Shutdown;
pub use sweep::{Outcome, SweepReport, Sweeper};
