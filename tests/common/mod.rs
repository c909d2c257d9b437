//! Shared utilities for integration tests.
//!
//! `MockFactory` hands out scripted in-memory clients keyed by endpoint URL.
//! Every call is logged so tests can assert on what the engine did.

#![allow(dead_code)]

use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use evm_sweeper::blockchain::{
    Account, BlockchainError, BlockchainResult, ChainClient, ChainId, ClientFactory,
    ConfirmationStatus, NetworkProfile, TransferRequest,
};
use evm_sweeper::config::SweepConfig;

pub const CHAIN_ID: u64 = 31_337;
pub const KEY_A: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const KEY_B: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
pub const RECIPIENT: &str = "0x000000000000000000000000000000000000dEaD";

/// How a client answers `wait_for_confirmation`.
#[derive(Debug, Clone)]
pub enum Confirm {
    Confirmed,
    Reverted,
    Error(BlockchainError),
    /// Never returns.
    Hang,
}

/// Scripted behaviour of one endpoint.
#[derive(Debug, Clone)]
pub struct Script {
    pub connect_error: Option<BlockchainError>,
    pub chain_id: BlockchainResult<u64>,
    pub block_number: BlockchainResult<u64>,
    pub balance: BlockchainResult<U256>,
    pub gas_price: BlockchainResult<u128>,
    pub estimate: BlockchainResult<u64>,
    /// Consumed one per send; `Ok` once empty.
    pub sends: VecDeque<BlockchainResult<()>>,
    pub confirm: Confirm,
    /// Pause inside `get_balance`.
    pub balance_delay: Duration,
}

impl Script {
    /// A healthy endpoint reporting `balance`, gas price 10 and 21000 gas.
    pub fn healthy(balance: u64) -> Self {
        Self {
            connect_error: None,
            chain_id: Ok(CHAIN_ID),
            block_number: Ok(100),
            balance: Ok(U256::from(balance)),
            gas_price: Ok(10),
            estimate: Ok(21_000),
            sends: VecDeque::new(),
            confirm: Confirm::Confirmed,
            balance_delay: Duration::ZERO,
        }
    }

    /// Every probe times out.
    pub fn unreachable() -> Self {
        Self {
            chain_id: Err(BlockchainError::Timeout(10)),
            ..Self::healthy(0)
        }
    }

    pub fn failing_sends(mut self, errors: impl IntoIterator<Item = BlockchainError>) -> Self {
        self.sends = errors.into_iter().map(Err).collect();
        self
    }
}

/// One recorded submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sent {
    pub endpoint: String,
    pub value: U256,
    pub gas_price: Option<u128>,
    pub gas_limit: Option<u64>,
}

#[derive(Debug, Default)]
struct Log {
    calls: Vec<(String, &'static str)>,
    sent: Vec<Sent>,
}

#[derive(Default)]
struct Concurrency {
    active: AtomicUsize,
    peak: AtomicUsize,
}

/// Factory serving scripted endpoints.
#[derive(Default)]
pub struct MockFactory {
    scripts: HashMap<String, Arc<Mutex<Script>>>,
    log: Arc<Mutex<Log>>,
    concurrency: Arc<Concurrency>,
}

impl MockFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, script: Script) -> Self {
        self.scripts
            .insert(url.to_string(), Arc::new(Mutex::new(script)));
        self
    }

    /// Calls made so far, as `(endpoint, method)`.
    pub fn calls(&self) -> Vec<(String, &'static str)> {
        self.log.lock().unwrap().calls.clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls().iter().filter(|(_, m)| *m == method).count()
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.log.lock().unwrap().sent.clone()
    }

    /// Highest number of concurrent `get_balance` calls observed.
    pub fn peak_concurrency(&self) -> usize {
        self.concurrency.peak.load(Ordering::SeqCst)
    }
}

impl ClientFactory for MockFactory {
    fn connect(
        &self,
        endpoint: &str,
        _profile: &NetworkProfile,
        _account: &Account,
    ) -> BlockchainResult<Arc<dyn ChainClient>> {
        self.log
            .lock()
            .unwrap()
            .calls
            .push((endpoint.to_string(), "connect"));

        let script = self
            .scripts
            .get(endpoint)
            .cloned()
            .ok_or_else(|| BlockchainError::Transport(format!("{} unreachable", endpoint)))?;
        if let Some(e) = script.lock().unwrap().connect_error.clone() {
            return Err(e);
        }

        Ok(Arc::new(MockClient {
            endpoint: endpoint.to_string(),
            script,
            log: self.log.clone(),
            concurrency: self.concurrency.clone(),
        }))
    }
}

struct MockClient {
    endpoint: String,
    script: Arc<Mutex<Script>>,
    log: Arc<Mutex<Log>>,
    concurrency: Arc<Concurrency>,
}

impl MockClient {
    fn record(&self, method: &'static str) {
        self.log
            .lock()
            .unwrap()
            .calls
            .push((self.endpoint.clone(), method));
    }
}

#[async_trait]
impl ChainClient for MockClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn get_chain_id(&self) -> BlockchainResult<ChainId> {
        self.record("chain_id");
        self.script.lock().unwrap().chain_id.clone().map(ChainId)
    }

    async fn get_block_number(&self) -> BlockchainResult<u64> {
        self.record("block_number");
        self.script.lock().unwrap().block_number.clone()
    }

    async fn get_balance(&self, _address: Address) -> BlockchainResult<U256> {
        self.record("balance");
        let (delay, balance) = {
            let script = self.script.lock().unwrap();
            (script.balance_delay, script.balance.clone())
        };

        let active = self.concurrency.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.concurrency.peak.fetch_max(active, Ordering::SeqCst);
        tokio::time::sleep(delay).await;
        self.concurrency.active.fetch_sub(1, Ordering::SeqCst);

        balance
    }

    async fn get_gas_price(&self) -> BlockchainResult<u128> {
        self.record("gas_price");
        self.script.lock().unwrap().gas_price.clone()
    }

    async fn estimate_gas(&self, _tx: &TransferRequest) -> BlockchainResult<u64> {
        self.record("estimate_gas");
        self.script.lock().unwrap().estimate.clone()
    }

    async fn send_transfer(&self, tx: &TransferRequest) -> BlockchainResult<TxHash> {
        self.record("send");
        let result = self.script.lock().unwrap().sends.pop_front().unwrap_or(Ok(()));

        let mut log = self.log.lock().unwrap();
        log.sent.push(Sent {
            endpoint: self.endpoint.clone(),
            value: tx.value,
            gas_price: tx.gas_price,
            gas_limit: tx.gas_limit,
        });
        let nonce = log.sent.len() as u8;
        drop(log);

        result.map(|()| TxHash::repeat_byte(nonce))
    }

    async fn wait_for_confirmation(&self, _tx_hash: TxHash) -> BlockchainResult<ConfirmationStatus> {
        self.record("confirm");
        let confirm = self.script.lock().unwrap().confirm.clone();
        match confirm {
            Confirm::Confirmed => Ok(ConfirmationStatus::Confirmed { block_number: 101 }),
            Confirm::Reverted => Ok(ConfirmationStatus::Failed("reverted".to_string())),
            Confirm::Error(e) => Err(e),
            Confirm::Hang => std::future::pending().await,
        }
    }
}

pub fn profile(name: &str, urls: &[&str]) -> NetworkProfile {
    NetworkProfile {
        name: name.to_string(),
        chain_id: CHAIN_ID,
        currency_symbol: "ETH".to_string(),
        explorer_url: Some("https://explorer.example".to_string()),
        rpc_urls: urls.iter().map(|u| u.to_string()).collect(),
    }
}

pub fn account(key: &str) -> Account {
    Account::from_private_key(key).unwrap()
}

/// Engine settings with the reference constants and no failover pause.
pub fn settings() -> SweepConfig {
    SweepConfig {
        recipient: RECIPIENT.to_string(),
        failover_delay_ms: 0,
        ..SweepConfig::default()
    }
}

/// JSON-RPC error returned by a stub handler: `(code, message)`.
pub type RpcFault = (i64, String);

/// Start a JSON-RPC node on an ephemeral port answering through `handler`.
///
/// Returns the endpoint URL. Connections are kept alive, so one client can
/// issue several requests on the same socket.
pub async fn start_rpc_stub<F>(handler: F) -> String
where
    F: Fn(&str, &Value) -> Result<Value, RpcFault> + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler = Arc::new(handler);

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            tokio::spawn(serve_rpc(socket, handler.clone()));
        }
    });

    format!("http://{}", addr)
}

async fn serve_rpc<F>(mut socket: TcpStream, handler: Arc<F>)
where
    F: Fn(&str, &Value) -> Result<Value, RpcFault> + Send + Sync + 'static,
{
    let mut buf: Vec<u8> = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let header_end = loop {
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
            match socket.read(&mut chunk).await {
                Ok(0) | Err(_) => return,
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
            }
        };

        let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
        let length = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        while buf.len() < header_end + length {
            match socket.read(&mut chunk).await {
                Ok(0) | Err(_) => return,
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
            }
        }

        let message: Vec<u8> = buf.drain(..header_end + length).collect();
        let request: Value = serde_json::from_slice(&message[header_end..]).unwrap();
        let method = request["method"].as_str().unwrap_or_default();
        let reply = match (*handler)(method, &request["params"]) {
            Ok(result) => json!({ "jsonrpc": "2.0", "id": request["id"], "result": result }),
            Err((code, message)) => json!({
                "jsonrpc": "2.0",
                "id": request["id"],
                "error": { "code": code, "message": message }
            }),
        };

        let body = reply.to_string();
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        );
        if socket.write_all(response.as_bytes()).await.is_err() {
            return;
        }
    }
}
