//! In-memory doubles for the monitor seams

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::task::JoinHandle;

use monitor::errors::RpcError;
use monitor::health::{HostResolver, SyncSnapshot};
use monitor::rpc::{BlockRecord, ChainRpc, FarmerRpc, HarvesterConnection, WalletBalance, WalletRpc};
use monitor::services::{Notice, NoticeEvent, Notifier, RecoveryActuator, RecoveryOutcome};

/// Keeps every notice instead of delivering it
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.notices.lock().unwrap().len()
    }

    pub fn count_of(&self, event: NoticeEvent) -> usize {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.event == event)
            .count()
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

/// Records restart requests; the "command" always succeeds at once
#[derive(Default)]
pub struct RecordingActuator {
    calls: Mutex<Vec<(String, String)>>,
}

impl RecordingActuator {
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl RecoveryActuator for RecordingActuator {
    fn trigger(&self, node_name: &str, reason: &str) -> JoinHandle<RecoveryOutcome> {
        self.calls
            .lock()
            .unwrap()
            .push((node_name.to_string(), reason.to_string()));
        tokio::spawn(async {
            RecoveryOutcome::Succeeded {
                output: String::new(),
            }
        })
    }
}

/// Answers `blockchain_state` from a script; the last entry repeats
#[derive(Default)]
pub struct ScriptedChain {
    states: Mutex<VecDeque<Result<SyncSnapshot, RpcError>>>,
    blocks: Mutex<HashMap<String, BlockRecord>>,
    block_fetches: AtomicUsize,
}

impl ScriptedChain {
    pub fn new(states: Vec<Result<SyncSnapshot, RpcError>>) -> Self {
        Self {
            states: Mutex::new(states.into()),
            ..Default::default()
        }
    }

    pub fn with_block(self, hash: &str, prev_hash: &str, height: u64, timestamp: Option<u64>) -> Self {
        self.blocks.lock().unwrap().insert(
            hash.to_string(),
            BlockRecord {
                header_hash: hash.to_string(),
                prev_hash: prev_hash.to_string(),
                height,
                timestamp,
            },
        );
        self
    }

    pub fn push(&self, state: Result<SyncSnapshot, RpcError>) {
        self.states.lock().unwrap().push_back(state);
    }

    pub fn block_fetches(&self) -> usize {
        self.block_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainRpc for ScriptedChain {
    async fn blockchain_state(&self) -> Result<SyncSnapshot, RpcError> {
        let mut states = self.states.lock().unwrap();
        let next = if states.len() > 1 {
            states.pop_front()
        } else {
            states.front().cloned()
        };
        next.unwrap_or_else(|| Err(transport("get_blockchain_state", "script exhausted")))
    }

    async fn block_record(&self, header_hash: &str) -> Result<BlockRecord, RpcError> {
        self.block_fetches.fetch_add(1, Ordering::SeqCst);
        self.blocks
            .lock()
            .unwrap()
            .get(header_hash)
            .cloned()
            .ok_or_else(|| RpcError::Rpc {
                endpoint: "get_block_record".to_string(),
                message: format!("Block {} not found", header_hash),
            })
    }
}

/// Farmer whose connection list can be swapped between polls
pub struct StaticFarmer {
    connections: Mutex<Result<Vec<HarvesterConnection>, RpcError>>,
}

impl StaticFarmer {
    pub fn new(hosts: &[&str]) -> Self {
        Self {
            connections: Mutex::new(Ok(connections(hosts))),
        }
    }

    pub fn set_hosts(&self, hosts: &[&str]) {
        *self.connections.lock().unwrap() = Ok(connections(hosts));
    }

    pub fn fail_with(&self, error: RpcError) {
        *self.connections.lock().unwrap() = Err(error);
    }
}

#[async_trait]
impl FarmerRpc for StaticFarmer {
    async fn harvester_connections(&self) -> Result<Vec<HarvesterConnection>, RpcError> {
        self.connections.lock().unwrap().clone()
    }
}

pub fn connections(hosts: &[&str]) -> Vec<HarvesterConnection> {
    hosts
        .iter()
        .map(|host| HarvesterConnection {
            host: host.to_string(),
            port: 8448,
            node_id: format!("id-{}", host),
        })
        .collect()
}

/// Name table; anything missing fails to resolve
#[derive(Default)]
pub struct MapResolver {
    names: Mutex<HashMap<String, IpAddr>>,
}

impl MapResolver {
    pub fn with(self, name: &str, ip: &str) -> Self {
        self.names
            .lock()
            .unwrap()
            .insert(name.to_string(), ip.parse().unwrap());
        self
    }

    /// Make `name` fail from the next lookup on
    pub fn forget(&self, name: &str) {
        self.names.lock().unwrap().remove(name);
    }
}

#[async_trait]
impl HostResolver for MapResolver {
    async fn resolve(&self, host: &str) -> io::Result<IpAddr> {
        self.names
            .lock()
            .unwrap()
            .get(host)
            .copied()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, host.to_string()))
    }
}

pub struct StaticWallet {
    pub balance: Result<WalletBalance, RpcError>,
}

#[async_trait]
impl WalletRpc for StaticWallet {
    async fn wallet_balance(&self, _wallet_id: u32) -> Result<WalletBalance, RpcError> {
        self.balance.clone()
    }
}

pub fn transport(endpoint: &str, reason: &str) -> RpcError {
    RpcError::Transport {
        endpoint: endpoint.to_string(),
        reason: reason.to_string(),
    }
}
