//! Failure classification for submission and query errors.
//!
//! The mapping is a plain `match` so it can be read and tested as a table,
//! independent of the retry loop that acts on it.

use crate::blockchain::BlockchainError;

/// How the retry state machine reacts to a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Lower the amount and retry on the same endpoint.
    InsufficientFunds,
    /// Abandon the endpoint and fail over.
    Network,
    /// Stop the sweep.
    Unrecoverable,
}

impl FailureClass {
    pub fn label(&self) -> &'static str {
        match self {
            FailureClass::InsufficientFunds => "insufficient_funds",
            FailureClass::Network => "network",
            FailureClass::Unrecoverable => "unrecoverable",
        }
    }
}

/// Map a chain-client error onto the sweep taxonomy.
pub fn classify(error: &BlockchainError) -> FailureClass {
    match error {
        BlockchainError::InsufficientFunds(_) => FailureClass::InsufficientFunds,

        BlockchainError::Transport(_)
        | BlockchainError::Timeout(_)
        | BlockchainError::RateLimited(_)
        | BlockchainError::NodeRejected { .. }
        | BlockchainError::ChainMismatch { .. } => FailureClass::Network,

        BlockchainError::MalformedResponse(_)
        | BlockchainError::Reverted(_)
        | BlockchainError::Wallet(_)
        | BlockchainError::InvalidEndpoint(_) => FailureClass::Unrecoverable,
    }
}
