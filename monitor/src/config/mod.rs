pub mod manager;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
pub use manager::{validate, ConfigManager};

use crate::constants::{defaults, recovery, sync};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub machine_name: String,
    #[serde(default = "default_rpc_timeout")]
    pub rpc_timeout_seconds: u64,
    #[serde(default = "default_chain_interval")]
    pub chain_check_interval_minutes: u64,
    #[serde(default = "default_farmer_interval")]
    pub farmer_check_interval_minutes: u64,
    #[serde(default = "default_daily_cron")]
    pub daily_cron: String,
    pub timezone: Option<String>,
    pub max_sync_retries: Option<u32>,
    pub max_block_walk_depth: Option<u32>,
    #[serde(default)]
    pub notify_webhook_url: String,
    pub notify_recipient: Option<String>,
    pub log_production: Option<bool>,
    /// Daily rotated log files are written here as well as to stdout
    pub log_dir: Option<String>,
    pub log_retention_days: Option<u32>,
    // Populated from individual node config files
    #[serde(skip)]
    pub nodes: BTreeMap<String, NodeFile>,
}

fn default_rpc_timeout() -> u64 {
    defaults::RPC_TIMEOUT_SECONDS
}

fn default_chain_interval() -> u64 {
    defaults::CHAIN_CHECK_INTERVAL_MINUTES
}

fn default_farmer_interval() -> u64 {
    defaults::FARMER_CHECK_INTERVAL_MINUTES
}

fn default_daily_cron() -> String {
    defaults::DAILY_CRON.to_string()
}

impl Config {
    pub fn max_sync_retries(&self) -> u32 {
        self.max_sync_retries.unwrap_or(sync::MAX_SYNC_RETRIES)
    }

    pub fn max_block_walk_depth(&self) -> u32 {
        self.max_block_walk_depth.unwrap_or(sync::MAX_BLOCK_WALK_DEPTH)
    }

    pub fn log_retention_days(&self) -> u32 {
        self.log_retention_days
            .unwrap_or(defaults::LOG_RETENTION_DAYS)
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_seconds)
    }

    pub fn chain_interval(&self) -> Duration {
        Duration::from_secs(self.chain_check_interval_minutes.saturating_mul(60))
    }

    pub fn farmer_interval(&self) -> Duration {
        Duration::from_secs(self.farmer_check_interval_minutes.saturating_mul(60))
    }

    pub fn enabled_nodes(&self) -> impl Iterator<Item = (&String, &NodeFile)> {
        self.nodes.iter().filter(|(_, file)| file.node.enabled)
    }
}

/// One `config/<name>.toml` file: a full node plus the optional farmer,
/// wallet and pool attached to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeFile {
    pub node: NodeConfig,
    pub farmer: Option<FarmerConfig>,
    pub wallet: Option<WalletConfig>,
    pub pool: Option<PoolConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    pub full_node_url: String,
    pub cert_path: String,
    pub key_path: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub restart_command: String,
    pub restart_working_dir: Option<String>,
    pub restart_timeout_seconds: Option<u64>,
}

fn default_enabled() -> bool {
    true
}

impl NodeConfig {
    pub fn restart_working_dir(&self) -> &str {
        self.restart_working_dir
            .as_deref()
            .unwrap_or(recovery::DEFAULT_WORKING_DIR)
    }

    pub fn restart_timeout(&self) -> Duration {
        Duration::from_secs(
            self.restart_timeout_seconds
                .unwrap_or(recovery::DEFAULT_TIMEOUT_SECONDS),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FarmerConfig {
    pub farmer_url: String,
    pub cert_path: String,
    pub key_path: String,
    #[serde(default)]
    pub expected_harvesters: Vec<String>,
    pub offline_flag_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    pub wallet_url: String,
    pub cert_path: String,
    pub key_path: String,
    #[serde(default = "default_wallet_id")]
    pub wallet_id: u32,
}

fn default_wallet_id() -> u32 {
    defaults::WALLET_ID
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolKind {
    Xchpool,
    Dpool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    pub kind: PoolKind,
    pub launcher_id: String,
    /// Overrides the pool's public API endpoint
    pub api_url: Option<String>,
}
