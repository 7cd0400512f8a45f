//! Health monitoring module
//!
//! Sync and harvester monitors, plus the pieces their poll cycles use.

pub mod block_time;
pub mod harvester;
pub mod offline_flag;
pub mod resolver;
pub mod sync;
pub mod types;

pub use block_time::{resolve_block_time, BlockTime, BlockTimeError};
pub use harvester::HarvesterMonitor;
pub use offline_flag::OfflineFlag;
pub use resolver::{DnsResolver, HostResolver};
pub use sync::{SyncMonitor, SyncSettings};
pub use types::{
    HarvesterOutcome, HarvesterRoster, MonitorState, MonitorStatus, SyncOutcome, SyncSnapshot,
};
