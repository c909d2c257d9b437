//! Chain-specific types and error definitions.

use alloy::transports::{RpcError, TransportErrorKind};
use thiserror::Error;

// Re-export NetworkProfile from config module to avoid duplication
pub use crate::config::schema::NetworkProfile;

/// JSON-RPC error code some providers use for request throttling.
const RATE_LIMIT_CODE: i64 = -32005;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ChainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error categories reported by a chain client.
///
/// These are the only signals the sweep engine reasons about; raw transport
/// errors are folded into one of them at the client boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockchainError {
    /// Connection refused, reset, DNS failure, HTTP error.
    #[error("Transport error: {0}")]
    Transport(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Endpoint is throttling us.
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Node refused the transfer because value + fee exceeds the balance.
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    /// Node answered with a JSON-RPC error unrelated to funds.
    #[error("RPC error {code}: {message}")]
    NodeRejected { code: i64, message: String },

    /// Response could not be decoded.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Transaction was mined but reverted.
    #[error("Transaction reverted: {0}")]
    Reverted(String),

    /// Invalid private key format or signing failure.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Endpoint reports a different chain than configured.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    /// Endpoint URL could not be used.
    #[error("Invalid endpoint '{0}'")]
    InvalidEndpoint(String),
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

impl From<RpcError<TransportErrorKind>> for BlockchainError {
    fn from(err: RpcError<TransportErrorKind>) -> Self {
        match err {
            RpcError::ErrorResp(payload) => {
                let message = payload.message.to_string();
                let lower = message.to_lowercase();
                if lower.contains("insufficient funds") || lower.contains("insufficient balance") {
                    BlockchainError::InsufficientFunds(message)
                } else if payload.code == RATE_LIMIT_CODE
                    || lower.contains("rate limit")
                    || lower.contains("too many requests")
                {
                    BlockchainError::RateLimited(message)
                } else {
                    BlockchainError::NodeRejected {
                        code: payload.code,
                        message,
                    }
                }
            }
            RpcError::Transport(TransportErrorKind::HttpError(http)) if http.status == 429 => {
                BlockchainError::RateLimited(format!("HTTP 429: {}", http.body))
            }
            RpcError::Transport(kind) => BlockchainError::Transport(kind.to_string()),
            RpcError::NullResp => BlockchainError::MalformedResponse("null response".to_string()),
            RpcError::DeserError { err, .. } => BlockchainError::MalformedResponse(err.to_string()),
            RpcError::LocalUsageError(e) => BlockchainError::Wallet(e.to_string()),
            other => BlockchainError::MalformedResponse(other.to_string()),
        }
    }
}

/// Transaction confirmation status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationStatus {
    /// Transaction is included with the required block depth.
    Confirmed { block_number: u64 },
    /// Transaction was mined but failed.
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::rpc::json_rpc::ErrorPayload;

    fn error_resp(code: i64, message: &'static str) -> RpcError<TransportErrorKind> {
        RpcError::ErrorResp(ErrorPayload {
            code,
            message: message.into(),
            data: None,
        })
    }

    #[test]
    fn test_chain_id_conversion() {
        let chain_id = ChainId::from(1u64);
        assert_eq!(chain_id.0, 1);
        assert_eq!(u64::from(chain_id), 1);
        assert_eq!(chain_id.to_string(), "1");
    }

    #[test]
    fn test_error_display() {
        let err = BlockchainError::Timeout(10);
        assert_eq!(err.to_string(), "RPC timeout after 10 seconds");

        let err = BlockchainError::ChainMismatch {
            expected: 1,
            actual: 5,
        };
        assert!(err.to_string().contains("expected 1, got 5"));
    }

    #[test]
    fn test_insufficient_funds_response() {
        let err = BlockchainError::from(error_resp(
            -32000,
            "insufficient funds for gas * price + value: balance 10, tx cost 20",
        ));
        assert!(matches!(err, BlockchainError::InsufficientFunds(_)));

        let err = BlockchainError::from(error_resp(-32003, "Insufficient balance for transfer"));
        assert!(matches!(err, BlockchainError::InsufficientFunds(_)));
    }

    #[test]
    fn test_rate_limited_response() {
        let err = BlockchainError::from(error_resp(RATE_LIMIT_CODE, "limit exceeded"));
        assert!(matches!(err, BlockchainError::RateLimited(_)));

        let err = BlockchainError::from(error_resp(-32000, "Too Many Requests"));
        assert!(matches!(err, BlockchainError::RateLimited(_)));
    }

    #[test]
    fn test_other_error_response() {
        let err = BlockchainError::from(error_resp(-32000, "nonce too low"));
        assert_eq!(
            err,
            BlockchainError::NodeRejected {
                code: -32000,
                message: "nonce too low".to_string()
            }
        );
    }

    #[test]
    fn test_transport_errors() {
        let err = BlockchainError::from(RpcError::Transport(TransportErrorKind::BackendGone));
        assert!(matches!(err, BlockchainError::Transport(_)));

        let err = BlockchainError::from(RpcError::<TransportErrorKind>::NullResp);
        assert!(matches!(err, BlockchainError::MalformedResponse(_)));
    }
}
