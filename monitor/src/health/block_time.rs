//! Best-effort lookup of the latest known block time
//!
//! Non-transaction blocks carry no timestamp, so when the peak has none we
//! walk back through `prev_hash` links until a block that does. The walk is
//! capped: a node that keeps handing out timestamp-less records must not be
//! able to stall the monitor loop.

use std::fmt;
use tracing::debug;

use super::types::SyncSnapshot;
use crate::errors::RpcError;
use crate::rpc::ChainRpc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockTime {
    /// Unix seconds
    pub timestamp: u64,
    /// Block records fetched to find it (0 when the peak had one)
    pub fetches: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlockTimeError {
    /// The snapshot has no peak to start walking from
    MissingPeakHash,
    /// A block record could not be fetched
    Fetch(RpcError),
    /// A record without a timestamp had no parent to continue from
    BrokenChain { height: u64 },
    /// No timestamped record within the allowed number of fetches
    DepthExceeded { depth: u32 },
}

impl fmt::Display for BlockTimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockTimeError::MissingPeakHash => write!(f, "peak has no header hash"),
            BlockTimeError::Fetch(e) => write!(f, "block record fetch failed: {}", e),
            BlockTimeError::BrokenChain { height } => {
                write!(f, "block at height {} has no timestamp and no parent", height)
            }
            BlockTimeError::DepthExceeded { depth } => {
                write!(f, "no timestamped block within {} records of the peak", depth)
            }
        }
    }
}

impl std::error::Error for BlockTimeError {}

/// Resolve the most recent known block time for a snapshot.
pub async fn resolve_block_time(
    rpc: &dyn ChainRpc,
    snapshot: &SyncSnapshot,
    max_depth: u32,
) -> Result<BlockTime, BlockTimeError> {
    if let Some(timestamp) = snapshot.known_peak_timestamp() {
        return Ok(BlockTime {
            timestamp,
            fetches: 0,
        });
    }

    if snapshot.peak_hash.is_empty() {
        return Err(BlockTimeError::MissingPeakHash);
    }

    let mut header_hash = snapshot.peak_hash.clone();
    for fetches in 1..=max_depth {
        let record = rpc
            .block_record(&header_hash)
            .await
            .map_err(BlockTimeError::Fetch)?;

        if let Some(timestamp) = record.known_timestamp() {
            debug!(
                "Found block time {} at height {} after {} fetches",
                timestamp, record.height, fetches
            );
            return Ok(BlockTime { timestamp, fetches });
        }

        if record.prev_hash.is_empty() {
            return Err(BlockTimeError::BrokenChain {
                height: record.height,
            });
        }
        header_hash = record.prev_hash;
    }

    Err(BlockTimeError::DepthExceeded { depth: max_depth })
}
