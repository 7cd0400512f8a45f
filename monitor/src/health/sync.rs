//! Chain sync monitor
//!
//! Polls the full node on a fixed interval and decides, across polls,
//! whether to keep waiting for the node to catch up on its own or to force
//! a restart:
//!
//! - an RPC failure restarts immediately
//! - a not-synced poll spends one retry; once `max_retries` are spent the
//!   next not-synced poll restarts and the budget starts over
//! - a synced poll clears the budget and announces recovery if the node was
//!   restarted or waited on

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::block_time::resolve_block_time;
use super::types::{MonitorKind, MonitorState, MonitorStatus, SyncOutcome, SyncSnapshot};
use crate::errors::RpcError;
use crate::rpc::ChainRpc;
use crate::services::notify_service::{format_unix_time, Notice, NoticeEvent, Notifier};
use crate::services::recovery_service::RecoveryActuator;

#[derive(Debug, Clone, Copy)]
pub struct SyncSettings {
    pub interval: Duration,
    pub max_retries: u32,
    pub max_block_walk_depth: u32,
}

pub struct SyncMonitor {
    name: String,
    machine_name: String,
    rpc: Arc<dyn ChainRpc>,
    notifier: Arc<dyn Notifier>,
    actuator: Arc<dyn RecoveryActuator>,
    settings: SyncSettings,
    state: MonitorState,
    status: watch::Sender<MonitorStatus>,
}

impl SyncMonitor {
    pub fn new(
        name: &str,
        machine_name: &str,
        rpc: Arc<dyn ChainRpc>,
        notifier: Arc<dyn Notifier>,
        actuator: Arc<dyn RecoveryActuator>,
        settings: SyncSettings,
    ) -> Self {
        let (status, _) = watch::channel(MonitorStatus::pending(name, MonitorKind::Sync));
        Self {
            name: name.to_string(),
            machine_name: machine_name.to_string(),
            rpc,
            notifier,
            actuator,
            settings,
            state: MonitorState::new(settings.max_retries),
            status,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    pub fn subscribe(&self) -> watch::Receiver<MonitorStatus> {
        self.status.subscribe()
    }

    /// Poll until cancelled
    pub async fn run(mut self, cancel: CancellationToken) {
        info!(
            "Sync monitor {} started: every {}s, restart after {} waits",
            self.name,
            self.settings.interval.as_secs(),
            self.settings.max_retries
        );

        loop {
            let outcome = tokio::select! {
                _ = cancel.cancelled() => break,
                outcome = self.poll_once() => outcome,
            };
            debug!("Sync monitor {} cycle outcome: {:?}", self.name, outcome);

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.settings.interval) => {}
            }
        }

        info!("Sync monitor {} stopped", self.name);
    }

    /// Run one poll cycle and apply its transition
    pub async fn poll_once(&mut self) -> SyncOutcome {
        let outcome = match self.rpc.blockchain_state().await {
            Err(e) => self.on_rpc_failure(e).await,
            Ok(snapshot) if snapshot.synced => self.on_synced().await,
            Ok(snapshot) => self.on_not_synced(&snapshot).await,
        };
        self.publish(&outcome);
        outcome
    }

    async fn on_rpc_failure(&mut self, e: RpcError) -> SyncOutcome {
        error!("Get blockchain state for {} failed: {}", self.name, e);

        let event = match e {
            RpcError::Rpc { .. } => NoticeEvent::StateRpcFailed,
            _ => NoticeEvent::StateRpcError,
        };
        self.send(event, e.detail(), "Node restart triggered").await;

        // Detached: the command logs its own result
        let _recovery = self.actuator.trigger(&self.name, &e.to_string());

        self.state.restarted = true;
        SyncOutcome::RpcFailed {
            error: e.to_string(),
        }
    }

    async fn on_synced(&mut self) -> SyncOutcome {
        info!("Blockchain {} is synced", self.name);

        let outcome = if self.state.restarted {
            self.send(NoticeEvent::BlockchainSynced, "Recovered after restart", "")
                .await;
            SyncOutcome::Recovered {
                after_restart: true,
            }
        } else if self.state.awaiting_auto_recover {
            self.send(
                NoticeEvent::BlockchainSynced,
                "Recovered on its own after waiting",
                "",
            )
            .await;
            SyncOutcome::Recovered {
                after_restart: false,
            }
        } else {
            SyncOutcome::Healthy
        };

        self.state.restarted = false;
        self.state.awaiting_auto_recover = false;
        self.state.retry_count = 0;
        outcome
    }

    async fn on_not_synced(&mut self, snapshot: &SyncSnapshot) -> SyncOutcome {
        error!(
            "Blockchain {} is not synced: tip height {}, progress height {}",
            self.name, snapshot.tip_height, snapshot.progress_height
        );

        let block_time = match resolve_block_time(
            self.rpc.as_ref(),
            snapshot,
            self.settings.max_block_walk_depth,
        )
        .await
        {
            Ok(block_time) => Some(format_unix_time(block_time.timestamp)),
            Err(e) => {
                warn!("Latest block time for {} unknown: {}", self.name, e);
                None
            }
        };

        if self.state.retry_count < self.state.max_retries {
            self.state.retry_count += 1;
            self.state.awaiting_auto_recover = true;
            let attempt = self.state.retry_count;

            let detail = format!(
                "Waiting for auto-recovery, attempt {}/{}: tip height {}, progress height {}, latest block time {}",
                attempt,
                self.state.max_retries,
                snapshot.tip_height,
                snapshot.progress_height,
                block_time.as_deref().unwrap_or("unknown")
            );
            self.send(NoticeEvent::BlockchainNotSynced, detail, "").await;

            SyncOutcome::Waiting { attempt }
        } else {
            let detail = format!(
                "Still not synced after {} waits, restarting node",
                self.state.max_retries
            );
            self.send(NoticeEvent::BlockchainNotSynced, detail, "").await;

            let _recovery = self.actuator.trigger(&self.name, "sync retries exhausted");

            self.state.restarted = true;
            // Grant the restarted node a full budget again
            self.state.retry_count = 0;
            SyncOutcome::ForcedRestart
        }
    }

    async fn send(&self, event: NoticeEvent, detail: impl Into<String>, remark: &str) {
        let notice = Notice::new(&self.machine_name, event, detail)
            .with_remark(format!("[{}] {}", self.name, remark).trim_end().to_string());
        self.notifier.notify(notice).await;
    }

    fn publish(&self, outcome: &SyncOutcome) {
        self.status.send_modify(|status| {
            status.last_check = Some(Utc::now());
            status.sync_state = Some(self.state.clone());
            status.sync_outcome = Some(outcome.clone());
        });
    }
}
