//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! RPC call from a sweep:
//!     → timeouts.rs (every call has a deadline)
//!     → On network-class failure: sweep::machine fails over
//!     → backoff.rs (jittered pause before the next endpoint)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - Failover pauses grow with each endpoint abandoned in one sweep
//! - Jitter keeps concurrent sweeps from hitting a fallback endpoint together

pub mod backoff;
pub mod timeouts;
