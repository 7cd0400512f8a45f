//! Application-wide constants for timeouts, thresholds, and configuration defaults
//!
//! Constants are grouped by the concern that owns them so the monitors, the
//! reporter and the configuration loader read from one place.

use std::time::Duration;

/// RPC client constants
pub mod rpc {
    use super::Duration;

    /// Timeout for establishing the TLS connection
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Endpoint names on the node RPC surface
    pub const GET_BLOCKCHAIN_STATE: &str = "get_blockchain_state";
    pub const GET_BLOCK_RECORD: &str = "get_block_record";
    pub const GET_HARVESTERS: &str = "get_harvesters";
    pub const GET_WALLET_BALANCE: &str = "get_wallet_balance";
}

/// Sync state machine thresholds
pub mod sync {
    /// Consecutive not-synced polls tolerated before a forced restart
    pub const MAX_SYNC_RETRIES: u32 = 6;

    /// Maximum block records fetched while looking for a usable timestamp
    pub const MAX_BLOCK_WALK_DEPTH: u32 = 64;
}

/// Recovery command constants
pub mod recovery {
    /// Working directory used when a node file does not name one
    pub const DEFAULT_WORKING_DIR: &str = "/root";

    /// Upper bound on a single restart command run
    pub const DEFAULT_TIMEOUT_SECONDS: u64 = 300;
}

/// Notification delivery constants
pub mod notify {
    /// Webhook request timeout
    pub const WEBHOOK_TIMEOUT_SECONDS: u64 = 10;

    /// Body the webhook answers with once it has taken the notice
    pub const WEBHOOK_ACCEPTED: &str = "success";

    /// Format used for `update_time` and block times in notices
    pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
}

/// Periodic reporting constants
pub mod report {
    use super::Duration;

    /// Timeout for plain HTTP calls to pool APIs
    pub const POOL_TIMEOUT: Duration = Duration::from_secs(5);

    pub const XCHPOOL_DAILY_EARNINGS_URL: &str =
        "https://farmer.xchpool.io/api/xchpool/farmer/earnings/daily";

    pub const DPOOL_REWARD_URL: &str = "https://vip.dpool.cc:9999/queryRewardRecord";

    /// Days of reward history requested from Dpool
    pub const DPOOL_REWARD_DAYS: u32 = 30;

    /// Base units per coin
    pub const MOJO_PER_COIN: f64 = 1_000_000_000_000.0;
}

/// Default configuration values
pub mod defaults {
    /// Default chain sync check interval in minutes
    pub const CHAIN_CHECK_INTERVAL_MINUTES: u64 = 10;

    /// Default harvester roster check interval in minutes
    pub const FARMER_CHECK_INTERVAL_MINUTES: u64 = 10;

    /// Default RPC timeout in seconds
    pub const RPC_TIMEOUT_SECONDS: u64 = 10;

    /// Daily at 09:00 (6-field: sec min hour day month dow)
    pub const DAILY_CRON: &str = "0 0 9 * * *";

    /// Default wallet id queried for balances
    pub const WALLET_ID: u32 = 1;

    /// Longest accepted check interval (one day)
    pub const MAX_CHECK_INTERVAL_MINUTES: u64 = 24 * 60;

    /// Days of daily log files kept when `log_dir` is set
    pub const LOG_RETENTION_DAYS: u32 = 30;

    /// Directory passed to `--config` when none is given
    pub const CONFIG_DIR: &str = "config";
}

/// Log file naming
pub mod logging {
    /// Files are named `farm-monitor.YYYY-MM-DD.log`
    pub const FILE_PREFIX: &str = "farm-monitor";

    pub const FILE_SUFFIX: &str = "log";
}
