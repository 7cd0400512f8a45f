//! Read-only status API over the running monitors

pub mod handlers;
pub mod server;

pub use server::{create_router, start_web_server};

use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::watch;

use crate::config::Config;
use crate::health::MonitorStatus;
use crate::services::notify_service::Notifier;

/// Latest status of every monitor, keyed by monitor name
#[derive(Clone, Default)]
pub struct StatusBoard {
    monitors: BTreeMap<String, watch::Receiver<MonitorStatus>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, status: watch::Receiver<MonitorStatus>) {
        self.monitors.insert(name.to_string(), status);
    }

    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }

    pub fn all(&self) -> Vec<MonitorStatus> {
        self.monitors.values().map(|rx| rx.borrow().clone()).collect()
    }

    pub fn get(&self, name: &str) -> Option<MonitorStatus> {
        self.monitors.get(name).map(|rx| rx.borrow().clone())
    }
}

// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub board: Arc<StatusBoard>,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(config: Arc<Config>, board: StatusBoard, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            config,
            board: Arc::new(board),
            notifier,
        }
    }
}
