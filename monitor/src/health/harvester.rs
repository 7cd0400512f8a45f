//! Harvester fleet monitor
//!
//! Compares the expected harvester hosts against the farmer's live
//! connections and alerts on the offline set. An unchanged offline set is
//! announced once; the last announced detail is kept in the offline flag
//! file so restarts of this process do not re-announce it either.

use chrono::Utc;
use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::offline_flag::OfflineFlag;
use super::resolver::{literal_ip, HostResolver};
use super::types::{
    HarvesterOutcome, HarvesterPresence, HarvesterRoster, MonitorKind, MonitorStatus,
};
use crate::rpc::{FarmerRpc, HarvesterConnection};
use crate::services::notify_service::{Notice, NoticeEvent, Notifier};

pub struct HarvesterMonitor {
    name: String,
    machine_name: String,
    rpc: Arc<dyn FarmerRpc>,
    resolver: Arc<dyn HostResolver>,
    notifier: Arc<dyn Notifier>,
    expected_hosts: Vec<String>,
    flag: OfflineFlag,
    interval: Duration,
    status: watch::Sender<MonitorStatus>,
}

impl HarvesterMonitor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: &str,
        machine_name: &str,
        rpc: Arc<dyn FarmerRpc>,
        resolver: Arc<dyn HostResolver>,
        notifier: Arc<dyn Notifier>,
        expected_hosts: Vec<String>,
        flag: OfflineFlag,
        interval: Duration,
    ) -> Self {
        let (status, _) = watch::channel(MonitorStatus::pending(name, MonitorKind::Harvester));
        Self {
            name: name.to_string(),
            machine_name: machine_name.to_string(),
            rpc,
            resolver,
            notifier,
            expected_hosts,
            flag,
            interval,
            status,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn subscribe(&self) -> watch::Receiver<MonitorStatus> {
        self.status.subscribe()
    }

    pub async fn run(mut self, cancel: CancellationToken) {
        info!(
            "Harvester monitor {} started: {} expected hosts, every {}s",
            self.name,
            self.expected_hosts.len(),
            self.interval.as_secs()
        );

        loop {
            let outcome = tokio::select! {
                _ = cancel.cancelled() => break,
                outcome = self.poll_once() => outcome,
            };
            debug!("Harvester monitor {} cycle outcome: {:?}", self.name, outcome);

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        info!("Harvester monitor {} stopped", self.name);
    }

    pub async fn poll_once(&mut self) -> HarvesterOutcome {
        let connections = match self.rpc.harvester_connections().await {
            Ok(connections) => connections,
            Err(e) => {
                error!("Get harvesters for {} failed: {}", self.name, e);
                self.send(NoticeEvent::HarvesterRpcError, e.detail()).await;
                let outcome = HarvesterOutcome::RpcFailed {
                    error: e.to_string(),
                };
                self.publish(&outcome, None);
                return outcome;
            }
        };

        let roster = self.build_roster(&connections).await;
        let outcome = self.handle_roster(&roster).await;
        self.publish(&outcome, Some(roster));
        outcome
    }

    /// Resolve every expected host and check it against the connections
    pub async fn build_roster(&self, connections: &[HarvesterConnection]) -> HarvesterRoster {
        let mut connected_ips: HashSet<IpAddr> = HashSet::new();
        let mut connected_names: HashSet<&str> = HashSet::new();
        for connection in connections {
            match literal_ip(&connection.host) {
                Some(ip) => {
                    connected_ips.insert(ip);
                }
                None => {
                    connected_names.insert(connection.host.as_str());
                }
            }
        }

        let mut roster = HarvesterRoster::default();
        for host in &self.expected_hosts {
            let address = match literal_ip(host) {
                Some(ip) => ip,
                None => match self.resolver.resolve(host).await {
                    Ok(ip) => ip,
                    Err(e) => {
                        warn!("Skipping harvester {}: resolution failed: {}", host, e);
                        roster.unresolved.push(host.clone());
                        continue;
                    }
                },
            };

            let online =
                connected_ips.contains(&address) || connected_names.contains(host.as_str());
            roster.harvesters.push(HarvesterPresence {
                host: host.clone(),
                address,
                online,
            });
        }
        roster
    }

    async fn handle_roster(&self, roster: &HarvesterRoster) -> HarvesterOutcome {
        let Some(detail) = roster.offline_detail() else {
            info!(
                "All {} harvesters of {} are online",
                roster.harvesters.len(),
                self.name
            );
            return HarvesterOutcome::AllOnline;
        };
        let offline = roster.offline_count();
        warn!(
            "{}: {} ({} of {} resolved hosts)",
            self.name,
            detail,
            offline,
            roster.harvesters.len()
        );

        let previous = match self.flag.load().await {
            Ok(previous) => previous,
            Err(e) => {
                error!("Reading offline flag failed, alerting anyway: {}", e);
                None
            }
        };

        if previous.as_deref() == Some(detail.as_str()) {
            info!("Offline set of {} unchanged, notice suppressed", self.name);
            return HarvesterOutcome::Suppressed { offline };
        }

        self.send(NoticeEvent::HarvesterOffline, detail.clone()).await;

        if let Err(e) = self.flag.store(&detail).await {
            error!("Writing offline flag failed: {}", e);
        }

        HarvesterOutcome::Notified { offline }
    }

    async fn send(&self, event: NoticeEvent, detail: String) {
        let notice =
            Notice::new(&self.machine_name, event, detail).with_remark(format!("[{}]", self.name));
        self.notifier.notify(notice).await;
    }

    fn publish(&self, outcome: &HarvesterOutcome, roster: Option<HarvesterRoster>) {
        self.status.send_modify(|status| {
            status.last_check = Some(Utc::now());
            status.harvester_outcome = Some(outcome.clone());
            status.roster = roster;
        });
    }
}
