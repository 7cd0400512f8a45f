use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::config::PoolKind;
use crate::constants::report;
use crate::rpc::{WalletBalance, WalletRpc};
use crate::services::notify_service::{Notice, NoticeEvent, Notifier};
use crate::services::pool_service::{PoolEarnings, PoolService};

pub struct WalletTarget {
    pub rpc: Arc<dyn WalletRpc>,
    pub wallet_id: u32,
}

/// What one node contributes to the report
pub struct ReportTarget {
    pub node: String,
    pub wallet: Option<WalletTarget>,
    pub pool: Option<PoolService>,
}

impl ReportTarget {
    pub fn is_empty(&self) -> bool {
        self.wallet.is_none() && self.pool.is_none()
    }
}

pub struct PeriodicReporter {
    machine_name: String,
    notifier: Arc<dyn Notifier>,
    targets: Vec<ReportTarget>,
}

impl PeriodicReporter {
    pub fn new(machine_name: &str, notifier: Arc<dyn Notifier>, targets: Vec<ReportTarget>) -> Self {
        Self {
            machine_name: machine_name.to_string(),
            notifier,
            targets: targets.into_iter().filter(|t| !t.is_empty()).collect(),
        }
    }

    pub fn has_targets(&self) -> bool {
        !self.targets.is_empty()
    }

    /// Query every target and send one notice per wallet and per pool,
    /// whether the query worked or not. Returns the number of notices sent.
    #[instrument(skip(self))]
    pub async fn report_once(&self) -> usize {
        let mut sent = 0;

        for target in &self.targets {
            if let Some(wallet) = &target.wallet {
                let (detail, remark) = match wallet.rpc.wallet_balance(wallet.wallet_id).await {
                    Ok(balance) => (format_balance(&balance), "Report"),
                    Err(e) => {
                        error!("Wallet balance for {} failed: {}", target.node, e);
                        (e.detail(), "Wallet balance query failed")
                    }
                };
                self.send(NoticeEvent::WalletBalance, &target.node, detail, remark)
                    .await;
                sent += 1;
            }

            if let Some(pool) = &target.pool {
                let name = pool_name(pool.kind());
                let (detail, remark) = match pool.daily_earnings().await {
                    Ok(earnings) => (format_earnings(name, &earnings), "Report"),
                    Err(e) => {
                        error!("Pool earnings for {} failed: {:#}", target.node, e);
                        (format!("{}: {:#}", name, e), "Pool earnings query failed")
                    }
                };
                self.send(NoticeEvent::PoolEarnings, &target.node, detail, remark)
                    .await;
                sent += 1;
            }
        }

        info!("Periodic report sent {} notices", sent);
        sent
    }

    async fn send(&self, event: NoticeEvent, node: &str, detail: String, remark: &str) {
        let notice = Notice::new(&self.machine_name, event, detail)
            .with_remark(format!("[{}] {}", node, remark));
        self.notifier.notify(notice).await;
    }
}

fn pool_name(kind: PoolKind) -> &'static str {
    match kind {
        PoolKind::Xchpool => "XCHPool",
        PoolKind::Dpool => "Dpool",
    }
}

fn mojo(amount: u64) -> f64 {
    amount as f64 / report::MOJO_PER_COIN
}

pub fn format_balance(balance: &WalletBalance) -> String {
    format!(
        "Wallet {}: confirmed {:.5}, spendable {:.5}, unconfirmed {:.5}",
        balance.wallet_id,
        mojo(balance.confirmed_wallet_balance),
        mojo(balance.spendable_balance),
        mojo(balance.unconfirmed_wallet_balance)
    )
}

pub fn format_earnings(pool: &str, earnings: &PoolEarnings) -> String {
    format!(
        "{}: yesterday {:.5}, today so far {:.5}",
        pool, earnings.yesterday, earnings.today
    )
}
