//! Health monitoring types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use crate::rpc::types::BlockchainState;

/// One poll's view of the chain. Produced fresh every cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSnapshot {
    pub synced: bool,
    pub tip_height: u64,
    pub progress_height: u64,
    pub peak_height: u64,
    pub peak_timestamp: Option<u64>,
    pub peak_hash: String,
}

impl SyncSnapshot {
    /// Peak timestamp if the node reported a usable one
    pub fn known_peak_timestamp(&self) -> Option<u64> {
        self.peak_timestamp.filter(|ts| *ts != 0)
    }
}

impl From<BlockchainState> for SyncSnapshot {
    fn from(state: BlockchainState) -> Self {
        let (peak_height, peak_timestamp, peak_hash) = match state.peak {
            Some(peak) => (peak.height, peak.timestamp, peak.header_hash),
            None => (0, None, String::new()),
        };
        Self {
            synced: state.sync.synced,
            tip_height: state.sync.sync_tip_height,
            progress_height: state.sync.sync_progress_height,
            peak_height,
            peak_timestamp,
            peak_hash,
        }
    }
}

/// Sync state machine bookkeeping for a single node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorState {
    pub restarted: bool,
    pub awaiting_auto_recover: bool,
    pub retry_count: u32,
    pub max_retries: u32,
}

impl MonitorState {
    pub fn new(max_retries: u32) -> Self {
        Self {
            restarted: false,
            awaiting_auto_recover: false,
            retry_count: 0,
            max_retries,
        }
    }
}

/// What a sync poll cycle decided
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// State could not be fetched; recovery was triggered
    RpcFailed { error: String },
    /// Synced and nothing to report
    Healthy,
    /// Synced again after a restart or a wait
    Recovered { after_restart: bool },
    /// Not synced, still inside the retry budget
    Waiting { attempt: u32 },
    /// Not synced and the retry budget is spent
    ForcedRestart,
}

/// One expected harvester after resolution and comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HarvesterPresence {
    pub host: String,
    pub address: IpAddr,
    pub online: bool,
}

/// Expected harvesters compared against the farmer's connections
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HarvesterRoster {
    pub harvesters: Vec<HarvesterPresence>,
    /// Hosts whose name could not be resolved this cycle
    pub unresolved: Vec<String>,
}

impl HarvesterRoster {
    pub fn offline(&self) -> impl Iterator<Item = &HarvesterPresence> {
        self.harvesters.iter().filter(|h| !h.online)
    }

    pub fn offline_count(&self) -> usize {
        self.offline().count()
    }

    /// Operator-facing description of the offline set, or `None` when the
    /// whole resolved fleet is connected. Built from the offline hosts only,
    /// so it stays the same while resolution of online hosts comes and goes.
    pub fn offline_detail(&self) -> Option<String> {
        let offline: Vec<&str> = self.offline().map(|h| h.host.as_str()).collect();
        if offline.is_empty() {
            return None;
        }
        Some(format!("Offline harvesters: {}", offline.join(", ")))
    }
}

/// What a harvester poll cycle decided
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum HarvesterOutcome {
    AllOnline,
    Notified { offline: usize },
    Suppressed { offline: usize },
    RpcFailed { error: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorKind {
    Sync,
    Harvester,
}

/// Latest view of one monitor, published after every cycle
#[derive(Debug, Clone, Serialize)]
pub struct MonitorStatus {
    pub name: String,
    pub kind: MonitorKind,
    pub last_check: Option<DateTime<Utc>>,
    pub sync_state: Option<MonitorState>,
    pub sync_outcome: Option<SyncOutcome>,
    pub harvester_outcome: Option<HarvesterOutcome>,
    pub roster: Option<HarvesterRoster>,
}

impl MonitorStatus {
    pub fn pending(name: &str, kind: MonitorKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            last_check: None,
            sync_state: None,
            sync_outcome: None,
            harvester_outcome: None,
            roster: None,
        }
    }
}
