//! Node RPC response structures
//!
//! Only the fields the monitors read are modelled; everything else in the
//! node's payloads is ignored by serde.

use serde::{Deserialize, Serialize};

/// Common envelope: `{success, error?, ...payload}`
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse<T> {
    #[serde(default)]
    pub success: bool,
    pub error: Option<String>,
    #[serde(flatten)]
    pub payload: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockchainStatePayload {
    pub blockchain_state: Option<BlockchainState>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockchainState {
    pub peak: Option<PeakRecord>,
    pub sync: SyncInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeakRecord {
    #[serde(default)]
    pub header_hash: String,
    #[serde(default)]
    pub height: u64,
    /// Null for non-transaction blocks
    pub timestamp: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncInfo {
    #[serde(default)]
    pub sync_mode: bool,
    pub synced: bool,
    #[serde(default)]
    pub sync_tip_height: u64,
    #[serde(default)]
    pub sync_progress_height: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockRecordPayload {
    pub block_record: Option<BlockRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockRecord {
    #[serde(default)]
    pub header_hash: String,
    #[serde(default)]
    pub prev_hash: String,
    #[serde(default)]
    pub height: u64,
    pub timestamp: Option<u64>,
}

impl BlockRecord {
    /// Timestamp if the record carries a usable one
    pub fn known_timestamp(&self) -> Option<u64> {
        self.timestamp.filter(|ts| *ts != 0)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HarvestersPayload {
    #[serde(default)]
    pub harvesters: Vec<HarvesterEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HarvesterEntry {
    pub connection: HarvesterConnection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarvesterConnection {
    pub host: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub node_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalletBalancePayload {
    pub wallet_balance: Option<WalletBalance>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletBalance {
    #[serde(default)]
    pub wallet_id: u32,
    #[serde(default)]
    pub confirmed_wallet_balance: u64,
    #[serde(default)]
    pub spendable_balance: u64,
    #[serde(default)]
    pub unconfirmed_wallet_balance: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct HeaderHashRequest<'a> {
    pub header_hash: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct WalletIdRequest {
    pub wallet_id: u32,
}
