//! Test configuration builder for writing config directories

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Writes `main.toml` plus one file per node into a temp directory
pub struct TestConfigBuilder {
    temp_dir: TempDir,
    main: String,
    nodes: Vec<(String, String)>,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self {
            temp_dir,
            main: default_main_toml(),
            nodes: Vec::new(),
        }
    }

    pub fn with_main(mut self, main: &str) -> Self {
        self.main = main.to_string();
        self
    }

    /// Append extra keys to the default main.toml
    pub fn with_main_extra(mut self, extra: &str) -> Self {
        self.main.push_str(extra);
        self.main.push('\n');
        self
    }

    pub fn with_node(mut self, name: &str, toml: &str) -> Self {
        self.nodes.push((name.to_string(), toml.to_string()));
        self
    }

    pub fn build(self) -> TestConfig {
        let config_dir = self.temp_dir.path().join("config");
        fs::create_dir_all(&config_dir).expect("Failed to create config dir");
        fs::write(config_dir.join("main.toml"), &self.main).expect("Failed to write main.toml");
        for (name, toml) in &self.nodes {
            fs::write(config_dir.join(format!("{}.toml", name)), toml)
                .expect("Failed to write node config");
        }
        TestConfig {
            _temp_dir: self.temp_dir,
            config_dir,
        }
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct TestConfig {
    _temp_dir: TempDir,
    pub config_dir: PathBuf,
}

impl TestConfig {
    pub fn dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn dir_string(&self) -> String {
        self.config_dir.display().to_string()
    }
}

pub fn default_main_toml() -> String {
    r#"
host = "127.0.0.1"
port = 8095
machine_name = "farm-test"
notify_webhook_url = ""
"#
    .to_string()
}

/// Node file with every optional section present
pub fn full_node_toml() -> String {
    r#"
[node]
full_node_url = "https://localhost:8555"
cert_path = "/root/.chia/mainnet/config/ssl/full_node/private_full_node.crt"
key_path = "/root/.chia/mainnet/config/ssl/full_node/private_full_node.key"
restart_command = "chia start node -r"

[farmer]
farmer_url = "https://localhost:8559"
cert_path = "/root/.chia/mainnet/config/ssl/farmer/private_farmer.crt"
key_path = "/root/.chia/mainnet/config/ssl/farmer/private_farmer.key"
expected_harvesters = ["10.0.0.5", "harvester-2.lan"]
offline_flag_path = "/var/lib/farm-monitor/harvesters.flag"

[wallet]
wallet_url = "https://localhost:9256"
cert_path = "/root/.chia/mainnet/config/ssl/wallet/private_wallet.crt"
key_path = "/root/.chia/mainnet/config/ssl/wallet/private_wallet.key"

[pool]
kind = "dpool"
launcher_id = "0xlauncher"
"#
    .to_string()
}

pub fn minimal_node_toml() -> String {
    r#"
[node]
full_node_url = "https://localhost:8555"
cert_path = "node.crt"
key_path = "node.key"
restart_command = "systemctl restart chia-node"
"#
    .to_string()
}
