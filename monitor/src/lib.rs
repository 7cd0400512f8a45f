pub mod config;
pub mod constants;
pub mod errors;
pub mod health;
pub mod logging;
pub mod rpc;
pub mod scheduler;
pub mod services;
pub mod web;

// Re-export commonly used types
pub use config::{Config, ConfigManager, NodeConfig, NodeFile};
pub use errors::{ConfigError, MonitorError, RpcError};
pub use health::{HarvesterMonitor, SyncMonitor};
pub use scheduler::{PeriodicReporter, ReportScheduler};
pub use services::{NotifyService, RecoveryService};
