//! Common test data

use monitor::health::SyncSnapshot;

pub const MACHINE: &str = "farm-test";
pub const NODE: &str = "node-a";

pub fn not_synced(tip: u64, progress: u64) -> SyncSnapshot {
    SyncSnapshot {
        synced: false,
        tip_height: tip,
        progress_height: progress,
        peak_height: progress,
        peak_timestamp: Some(1_700_000_000),
        peak_hash: format!("0xpeak{}", progress),
    }
}

pub fn synced(height: u64) -> SyncSnapshot {
    SyncSnapshot {
        synced: true,
        tip_height: height,
        progress_height: height,
        peak_height: height,
        peak_timestamp: Some(1_700_000_000),
        peak_hash: format!("0xpeak{}", height),
    }
}

/// Snapshot whose peak is a non-transaction block
pub fn peak_without_timestamp(height: u64, hash: &str) -> SyncSnapshot {
    SyncSnapshot {
        synced: false,
        tip_height: height + 100,
        progress_height: height,
        peak_height: height,
        peak_timestamp: None,
        peak_hash: hash.to_string(),
    }
}
