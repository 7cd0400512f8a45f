use super::{Config, NodeFile};
use crate::constants::defaults;
use crate::errors::ConfigError;
use crate::scheduler::validate_cron;
use anyhow::{anyhow, Result};
use glob::glob;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info};

pub struct ConfigManager {
    current_config: Arc<Config>,
}

impl ConfigManager {
    pub async fn new(config_dir: String) -> Result<Self> {
        let config = Self::load_configuration(&config_dir).await?;
        Ok(Self {
            current_config: Arc::new(config),
        })
    }

    pub fn get_current_config(&self) -> Arc<Config> {
        self.current_config.clone()
    }

    async fn load_configuration(config_dir: &str) -> Result<Config> {
        let main_config_path = format!("{}/main.toml", config_dir);
        let main_config_content =
            fs::read_to_string(&main_config_path)
                .await
                .map_err(|e| ConfigError::LoadFailed {
                    path: main_config_path.clone(),
                    reason: e.to_string(),
                })?;

        let mut config: Config =
            toml::from_str(&main_config_content).map_err(|e| ConfigError::ParseError {
                path: main_config_path.clone(),
                reason: e.to_string(),
            })?;

        // Every other *.toml in the directory describes one node
        let pattern = format!("{}/*.toml", config_dir);
        let mut nodes = BTreeMap::new();

        for entry in glob(&pattern).map_err(|e| anyhow!("Glob pattern error: {}", e))? {
            let path = entry.map_err(|e| anyhow!("Glob entry error: {}", e))?;
            let filename = path
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| anyhow!("Invalid filename"))?;

            if filename == "main.toml" {
                continue;
            }

            let node_name = filename
                .strip_suffix(".toml")
                .ok_or_else(|| anyhow!("Invalid config filename: {}", filename))?;

            debug!("Loading node config: {}", path.display());

            let content = fs::read_to_string(&path)
                .await
                .map_err(|e| ConfigError::LoadFailed {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;

            let node_file: NodeFile =
                toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;

            nodes.insert(node_name.to_string(), node_file);
        }

        config.nodes = nodes;
        validate(&config)?;

        info!(
            "Loaded {} nodes ({} enabled, {} farmers, {} wallets, {} pools)",
            config.nodes.len(),
            config.enabled_nodes().count(),
            config.nodes.values().filter(|n| n.farmer.is_some()).count(),
            config.nodes.values().filter(|n| n.wallet.is_some()).count(),
            config.nodes.values().filter(|n| n.pool.is_some()).count(),
        );

        Ok(config)
    }
}

/// Reject values that would make a monitor loop spin or never fire
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.chain_check_interval_minutes == 0 {
        return Err(invalid("chain_check_interval_minutes", "must be at least 1"));
    }
    if config.farmer_check_interval_minutes == 0 {
        return Err(invalid("farmer_check_interval_minutes", "must be at least 1"));
    }
    for (field, minutes) in [
        ("chain_check_interval_minutes", config.chain_check_interval_minutes),
        ("farmer_check_interval_minutes", config.farmer_check_interval_minutes),
    ] {
        if minutes > defaults::MAX_CHECK_INTERVAL_MINUTES {
            return Err(invalid(
                field,
                &format!("must be at most {}", defaults::MAX_CHECK_INTERVAL_MINUTES),
            ));
        }
    }
    if config.rpc_timeout_seconds == 0 {
        return Err(invalid("rpc_timeout_seconds", "must be at least 1"));
    }
    if config.max_sync_retries == Some(0) {
        return Err(invalid("max_sync_retries", "must be at least 1"));
    }
    if config.max_block_walk_depth == Some(0) {
        return Err(invalid("max_block_walk_depth", "must be at least 1"));
    }
    if config.log_retention_days == Some(0) {
        return Err(invalid("log_retention_days", "must be at least 1"));
    }
    if config
        .log_dir
        .as_deref()
        .is_some_and(|dir| dir.trim().is_empty())
    {
        return Err(invalid("log_dir", "must not be empty"));
    }

    validate_cron(&config.daily_cron).map_err(|e| invalid("daily_cron", &e.to_string()))?;

    if let Some(tz) = &config.timezone {
        tz.parse::<chrono_tz::Tz>()
            .map_err(|e| invalid("timezone", &e.to_string()))?;
    }

    for (name, file) in &config.nodes {
        if file.node.restart_command.trim().is_empty() {
            return Err(invalid(
                &format!("{}.node.restart_command", name),
                "must not be empty",
            ));
        }
        if let Some(farmer) = &file.farmer {
            if farmer.offline_flag_path.trim().is_empty() {
                return Err(invalid(
                    &format!("{}.farmer.offline_flag_path", name),
                    "must not be empty",
                ));
            }
        }
    }

    Ok(())
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
