//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Key file / environment (private keys)
//!     → wallet.rs (key parsing, Account)
//!     → client.rs (one endpoint + one signer, every call with a deadline)
//!     → transaction.rs (build transfer, broadcast, confirm)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from the key file or environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::{AlloyClientFactory, BlockchainClient, ChainClient, ClientFactory};
pub use transaction::TransferRequest;
pub use types::{BlockchainError, BlockchainResult, ChainId, ConfirmationStatus, NetworkProfile};
pub use wallet::Account;
