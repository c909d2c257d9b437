//! Blockchain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Bind one JSON-RPC endpoint to one signing account
//! - Query chain state (chain id, block number, balance, gas price)
//! - Estimate, sign, broadcast and confirm transfers
//! - Fold transport failures into `BlockchainError` categories
//!
//! The sweep engine only sees the `ChainClient` and `ClientFactory` traits,
//! so endpoints can be replaced by scripted doubles in tests.

use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::blockchain::transaction::{wait_for_confirmation, TransferRequest};
use crate::blockchain::types::{
    BlockchainError, BlockchainResult, ChainId, ConfirmationStatus, NetworkProfile,
};
use crate::blockchain::wallet::Account;
use crate::config::RpcConfig;
use crate::resilience::timeouts::with_deadline;

/// The primitive calls the sweep engine needs from one endpoint.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// URL this client is bound to.
    fn endpoint(&self) -> &str;

    async fn get_chain_id(&self) -> BlockchainResult<ChainId>;

    async fn get_block_number(&self) -> BlockchainResult<u64>;

    async fn get_balance(&self, address: Address) -> BlockchainResult<U256>;

    /// Current price per gas unit in wei.
    async fn get_gas_price(&self) -> BlockchainResult<u128>;

    async fn estimate_gas(&self, tx: &TransferRequest) -> BlockchainResult<u64>;

    /// Sign and broadcast; returns the transaction hash.
    async fn send_transfer(&self, tx: &TransferRequest) -> BlockchainResult<TxHash>;

    /// Block until the transaction is confirmed or observed as failed.
    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> BlockchainResult<ConfirmationStatus>;
}

/// Opens clients bound to a single endpoint URL.
pub trait ClientFactory: Send + Sync {
    fn connect(
        &self,
        endpoint: &str,
        profile: &NetworkProfile,
        account: &Account,
    ) -> BlockchainResult<Arc<dyn ChainClient>>;
}

/// Alloy-backed client for one endpoint and one signing account.
#[derive(Clone)]
pub struct BlockchainClient {
    /// Endpoint URL as configured.
    endpoint: String,
    /// Signing HTTP provider.
    provider: Arc<dyn Provider + Send + Sync>,
    /// Chain ID stamped on outgoing transactions.
    chain_id: u64,
    /// Request timeout duration.
    timeout_duration: Duration,
    /// Receipt polling interval.
    poll_interval: Duration,
    /// Confirmations required before success.
    confirmations: u32,
}

impl BlockchainClient {
    /// Create a new client. No network I/O happens here.
    ///
    /// # Arguments
    /// * `endpoint` - JSON-RPC URL
    /// * `chain_id` - Chain the endpoint is expected to serve
    /// * `account` - Account whose key signs outgoing transfers
    /// * `rpc` - Timeout and confirmation settings
    pub fn new(
        endpoint: &str,
        chain_id: u64,
        account: &Account,
        rpc: &RpcConfig,
    ) -> BlockchainResult<Self> {
        let url: url::Url = endpoint
            .parse()
            .map_err(|e| BlockchainError::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;

        let wallet = EthereumWallet::from(account.signer().clone());
        let provider = ProviderBuilder::new().wallet(wallet).connect_http(url);

        Ok(Self {
            endpoint: endpoint.to_string(),
            provider: Arc::new(provider) as Arc<dyn Provider + Send + Sync>,
            chain_id,
            timeout_duration: Duration::from_secs(rpc.timeout_secs),
            poll_interval: Duration::from_millis(rpc.confirmation_poll_ms),
            confirmations: rpc.confirmations,
        })
    }
}

#[async_trait]
impl ChainClient for BlockchainClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn get_chain_id(&self) -> BlockchainResult<ChainId> {
        with_deadline(self.timeout_duration, self.provider.get_chain_id())
            .await
            .map(ChainId)
    }

    async fn get_block_number(&self) -> BlockchainResult<u64> {
        with_deadline(self.timeout_duration, self.provider.get_block_number()).await
    }

    async fn get_balance(&self, address: Address) -> BlockchainResult<U256> {
        with_deadline(self.timeout_duration, self.provider.get_balance(address)).await
    }

    async fn get_gas_price(&self) -> BlockchainResult<u128> {
        with_deadline(self.timeout_duration, self.provider.get_gas_price()).await
    }

    async fn estimate_gas(&self, tx: &TransferRequest) -> BlockchainResult<u64> {
        let request = tx.to_request(self.chain_id);
        with_deadline(self.timeout_duration, self.provider.estimate_gas(request)).await
    }

    async fn send_transfer(&self, tx: &TransferRequest) -> BlockchainResult<TxHash> {
        // The provider's cached nonce advances even for rejected sends, so
        // read the chain's pending nonce for every submission.
        let nonce = with_deadline(
            self.timeout_duration,
            self.provider.get_transaction_count(tx.from).pending(),
        )
        .await?;
        let request = tx.to_request(self.chain_id).with_nonce(nonce);
        let pending = with_deadline(self.timeout_duration, self.provider.send_transaction(request)).await?;
        Ok(*pending.tx_hash())
    }

    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> BlockchainResult<ConfirmationStatus> {
        wait_for_confirmation(
            self.provider.as_ref(),
            tx_hash,
            self.confirmations,
            self.poll_interval,
            self.timeout_duration,
        )
        .await
    }
}

impl std::fmt::Debug for BlockchainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockchainClient")
            .field("endpoint", &self.endpoint)
            .field("chain_id", &self.chain_id)
            .field("timeout_secs", &self.timeout_duration.as_secs())
            .finish()
    }
}

/// Factory producing `BlockchainClient`s from shared RPC settings.
#[derive(Debug, Clone)]
pub struct AlloyClientFactory {
    rpc: RpcConfig,
}

impl AlloyClientFactory {
    pub fn new(rpc: RpcConfig) -> Self {
        Self { rpc }
    }
}

impl ClientFactory for AlloyClientFactory {
    fn connect(
        &self,
        endpoint: &str,
        profile: &NetworkProfile,
        account: &Account,
    ) -> BlockchainResult<Arc<dyn ChainClient>> {
        let client = BlockchainClient::new(endpoint, profile.chain_id, account, &self.rpc)?;
        Ok(Arc::new(client))
    }
}
