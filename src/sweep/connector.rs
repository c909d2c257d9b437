//! Endpoint connector.
//!
//! Walks a network's endpoint list from a cursor and returns the first one
//! that answers a liveness probe on the expected chain.

use std::sync::Arc;

use crate::blockchain::{
    Account, BlockchainError, BlockchainResult, ChainClient, ChainId, ClientFactory,
    NetworkProfile,
};
use crate::observability::metrics;
use crate::sweep::types::{Stage, SweepError, SweepTrail};

/// A verified binding to one endpoint.
///
/// Only `connect` builds these, so holding one means the endpoint reported
/// the profile's chain ID and answered a block-height probe.
#[derive(Clone)]
pub struct Connection {
    client: Arc<dyn ChainClient>,
    index: usize,
    chain_id: ChainId,
    block_number: u64,
}

impl Connection {
    pub fn client(&self) -> &dyn ChainClient {
        self.client.as_ref()
    }

    /// Position of the endpoint in the profile's list.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn endpoint(&self) -> &str {
        self.client.endpoint()
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    /// Block height observed by the liveness probe.
    pub fn block_number(&self) -> u64 {
        self.block_number
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("endpoint", &self.endpoint())
            .field("index", &self.index)
            .field("chain_id", &self.chain_id)
            .field("block_number", &self.block_number)
            .finish()
    }
}

/// Connect to the first healthy endpoint at or after `start_index`.
///
/// Every probe, successful or not, is appended to `trail`. A chain ID
/// mismatch disqualifies the endpoint; it is not retried.
pub async fn connect(
    factory: &dyn ClientFactory,
    profile: &NetworkProfile,
    account: &Account,
    start_index: usize,
    trail: &mut SweepTrail,
) -> Result<Connection, SweepError> {
    let mut tried = 0;

    for (index, url) in profile.rpc_urls.iter().enumerate().skip(start_index) {
        tried += 1;
        tracing::debug!(endpoint = %url, index = index, "Connecting");

        match probe(factory, profile, account, url, index).await {
            Ok(connection) => {
                tracing::info!(
                    endpoint = %url,
                    block_number = connection.block_number,
                    "Connected"
                );
                trail.success(
                    url,
                    Stage::Connect,
                    Some(format!("block {}", connection.block_number)),
                );
                metrics::record_endpoint_attempt(&profile.name, true);
                return Ok(connection);
            }
            Err(e) => {
                tracing::warn!(endpoint = %url, error = %e, "Endpoint unusable, trying next");
                trail.failure(url, Stage::Connect, &e);
                metrics::record_endpoint_attempt(&profile.name, false);
            }
        }
    }

    tracing::error!(tried = tried, "All endpoints failed to connect");
    Err(SweepError::NoReachableEndpoint {
        network: profile.name.clone(),
        tried,
    })
}

async fn probe(
    factory: &dyn ClientFactory,
    profile: &NetworkProfile,
    account: &Account,
    url: &str,
    index: usize,
) -> BlockchainResult<Connection> {
    let client = factory.connect(url, profile, account)?;

    let chain_id = client.get_chain_id().await?;
    if chain_id.0 != profile.chain_id {
        return Err(BlockchainError::ChainMismatch {
            expected: profile.chain_id,
            actual: chain_id.0,
        });
    }

    let block_number = client.get_block_number().await?;

    Ok(Connection {
        client,
        index,
        chain_id,
        block_number,
    })
}
