//! Timeout enforcement.
//!
//! Every RPC call goes through `with_deadline`, so a stalled endpoint
//! surfaces as `BlockchainError::Timeout` (network class) instead of
//! hanging the sweep.

use std::future::IntoFuture;
use std::time::Duration;

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Run a fallible call with a deadline, converting its error into a `BlockchainError`.
pub async fn with_deadline<F, T, E>(duration: Duration, call: F) -> BlockchainResult<T>
where
    F: IntoFuture<Output = Result<T, E>>,
    E: Into<BlockchainError>,
{
    match tokio::time::timeout(duration, call).await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => Err(BlockchainError::Timeout(duration.as_secs())),
    }
}
