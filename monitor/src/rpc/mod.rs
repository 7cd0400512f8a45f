//! Node RPC surface
//!
//! The monitors talk to the node through the traits below so a cycle can
//! be driven against an in-memory double as easily as against a live node.

pub mod client;
pub mod types;

pub use client::RpcClient;
pub use types::{BlockRecord, HarvesterConnection, WalletBalance};

use async_trait::async_trait;

use crate::errors::RpcError;
use crate::health::types::SyncSnapshot;

/// Full node queries used by the sync monitor
#[async_trait]
pub trait ChainRpc: Send + Sync {
    async fn blockchain_state(&self) -> Result<SyncSnapshot, RpcError>;

    async fn block_record(&self, header_hash: &str) -> Result<BlockRecord, RpcError>;
}

/// Farmer queries used by the harvester monitor
#[async_trait]
pub trait FarmerRpc: Send + Sync {
    async fn harvester_connections(&self) -> Result<Vec<HarvesterConnection>, RpcError>;
}

/// Wallet queries used by the periodic reporter
#[async_trait]
pub trait WalletRpc: Send + Sync {
    async fn wallet_balance(&self, wallet_id: u32) -> Result<WalletBalance, RpcError>;
}
