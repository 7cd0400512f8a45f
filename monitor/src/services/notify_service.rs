use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use reqwest::Client;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::constants::notify;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeEvent {
    StateRpcError,
    StateRpcFailed,
    BlockchainSynced,
    BlockchainNotSynced,
    HarvesterOffline,
    HarvesterRpcError,
    WalletBalance,
    PoolEarnings,
    Test,
}

impl NoticeEvent {
    pub fn label(&self) -> &'static str {
        match self {
            NoticeEvent::StateRpcError => "Blockchain state RPC error",
            NoticeEvent::StateRpcFailed => "Blockchain state RPC failed",
            NoticeEvent::BlockchainSynced => "Blockchain synced",
            NoticeEvent::BlockchainNotSynced => "Blockchain not synced",
            NoticeEvent::HarvesterOffline => "Harvester offline",
            NoticeEvent::HarvesterRpcError => "Harvester RPC error",
            NoticeEvent::WalletBalance => "Wallet balance",
            NoticeEvent::PoolEarnings => "Pool earnings",
            NoticeEvent::Test => "Test event",
        }
    }
}

impl fmt::Display for NoticeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One operator notification
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub machine_name: String,
    pub event: NoticeEvent,
    pub detail: String,
    pub remark: String,
    pub update_time: String,
}

impl Notice {
    pub fn new(machine_name: &str, event: NoticeEvent, detail: impl Into<String>) -> Self {
        Self {
            machine_name: machine_name.to_string(),
            event,
            detail: detail.into(),
            remark: String::new(),
            update_time: Local::now().format(notify::TIME_FORMAT).to_string(),
        }
    }

    pub fn with_remark(mut self, remark: impl Into<String>) -> Self {
        self.remark = remark.into();
        self
    }
}

/// Operator channel. Delivery is best-effort: implementations log failures
/// and never hand them back to the monitor loop.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notice: Notice);
}

/// Body posted to the webhook
#[derive(Debug, Serialize)]
pub struct WebhookPayload<'a> {
    pub machine_name: &'a str,
    pub event: &'a str,
    pub detail: &'a str,
    pub update_time: &'a str,
    pub remark: &'a str,
    pub recipient: &'a str,
}

/// What happened to one webhook post
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// No webhook configured
    Disabled,
    Accepted,
    /// Reached the webhook but it did not acknowledge the notice
    Rejected { reason: String },
    /// Timeout or connection failure
    Failed { reason: String },
}

#[derive(Clone)]
pub struct NotifyService {
    webhook_url: String,
    recipient: String,
    client: Client,
}

impl NotifyService {
    pub fn new(webhook_url: String, recipient: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(notify::WEBHOOK_TIMEOUT_SECONDS))
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client for NotifyService: {}", e))?;

        Ok(Self {
            webhook_url,
            recipient: recipient.unwrap_or_default(),
            client,
        })
    }

    pub fn is_enabled(&self) -> bool {
        !self.webhook_url.is_empty()
    }

    pub fn get_webhook_url(&self) -> &str {
        &self.webhook_url
    }

    /// Post one notice. Only a body of `success` (quotes and whitespace
    /// ignored) counts as accepted.
    pub async fn deliver(&self, notice: &Notice) -> Delivery {
        if !self.is_enabled() {
            debug!("No webhook URL configured, skipping notice: {}", notice.event);
            return Delivery::Disabled;
        }

        let payload = WebhookPayload {
            machine_name: &notice.machine_name,
            event: notice.event.label(),
            detail: &notice.detail,
            update_time: &notice.update_time,
            remark: &notice.remark,
            recipient: &self.recipient,
        };

        let delivery = match timeout(
            Duration::from_secs(notify::WEBHOOK_TIMEOUT_SECONDS),
            self.client.post(&self.webhook_url).json(&payload).send(),
        )
        .await
        {
            Ok(Ok(response)) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                let reply = body.trim().trim_matches('"');
                if !status.is_success() {
                    Delivery::Rejected {
                        reason: format!("status {}: {}", status, reply),
                    }
                } else if reply != notify::WEBHOOK_ACCEPTED {
                    Delivery::Rejected {
                        reason: format!("unexpected reply: {}", reply),
                    }
                } else {
                    Delivery::Accepted
                }
            }
            Ok(Err(e)) => Delivery::Failed {
                reason: e.to_string(),
            },
            Err(_) => Delivery::Failed {
                reason: "timeout".to_string(),
            },
        };

        match &delivery {
            Delivery::Accepted => {
                info!("Notice sent for {}: {}", notice.machine_name, notice.event)
            }
            Delivery::Rejected { reason } => {
                warn!("Notice webhook rejected {}: {}", notice.event, reason)
            }
            Delivery::Failed { reason } => {
                warn!("Failed to send notice {}: {}", notice.event, reason)
            }
            Delivery::Disabled => {}
        }
        delivery
    }
}

#[async_trait]
impl Notifier for NotifyService {
    async fn notify(&self, notice: Notice) {
        info!(
            "Notice [{}] {}: {} {}",
            notice.machine_name, notice.event, notice.detail, notice.remark
        );
        self.deliver(&notice).await;
    }
}

/// Render a unix timestamp in the notice time format, local time
pub fn format_unix_time(timestamp: u64) -> String {
    i64::try_from(timestamp)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|utc| {
            utc.with_timezone(&Local)
                .format(notify::TIME_FORMAT)
                .to_string()
        })
        .unwrap_or_else(|| format!("unix {}", timestamp))
}
