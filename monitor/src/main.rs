use anyhow::Result;
use clap::Parser;
use futures::future::join_all;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use monitor::config::ConfigManager;
use monitor::constants::defaults;
use monitor::health::{DnsResolver, HarvesterMonitor, OfflineFlag, SyncMonitor, SyncSettings};
use monitor::logging;
use monitor::rpc::RpcClient;
use monitor::scheduler::{PeriodicReporter, ReportScheduler, ReportTarget, WalletTarget};
use monitor::services::{Notifier, NotifyService, PoolService, RecoveryService};
use monitor::web::{start_web_server, AppState, StatusBoard};

/// Chia farm monitor: sync watchdog, harvester roster and daily reports
#[derive(Parser, Debug)]
#[command(name = "farm-monitor")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Directory holding main.toml and one TOML file per node
    #[arg(short, long, default_value = defaults::CONFIG_DIR)]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_manager = ConfigManager::new(cli.config.clone()).await?;
    let config = config_manager.get_current_config();

    let _log_guard = logging::init(&config)?;

    info!("Starting farm monitor on {}", config.machine_name);
    if let Some(dir) = &config.log_dir {
        info!(
            "Logging to {} as well, keeping {} days",
            dir,
            config.log_retention_days()
        );
    }
    info!(
        "Configuration loaded: {} nodes ({} enabled), sync every {}s, harvesters every {}s",
        config.nodes.len(),
        config.enabled_nodes().count(),
        config.chain_interval().as_secs(),
        config.farmer_interval().as_secs()
    );

    let notify_service = NotifyService::new(
        config.notify_webhook_url.clone(),
        config.notify_recipient.clone(),
    )?;
    if notify_service.is_enabled() {
        info!(
            "Notifications enabled with webhook: {}",
            notify_service.get_webhook_url()
        );
    } else {
        warn!(
            "No notify_webhook_url configured in {}/main.toml - notices are only logged",
            cli.config
        );
    }
    let notifier: Arc<dyn Notifier> = Arc::new(notify_service);

    let cancel = CancellationToken::new();
    let mut board = StatusBoard::new();
    let mut tasks: Vec<JoinHandle<()>> = Vec::new();
    let mut targets = Vec::new();

    let settings = SyncSettings {
        interval: config.chain_interval(),
        max_retries: config.max_sync_retries(),
        max_block_walk_depth: config.max_block_walk_depth(),
    };
    info!(
        "Sync monitors restart a node after {} not-synced polls (about {} minutes)",
        settings.max_retries,
        settings.interval.as_secs() * u64::from(settings.max_retries) / 60
    );

    for (name, file) in config.enabled_nodes() {
        let chain = RpcClient::new(
            &file.node.full_node_url,
            &file.node.cert_path,
            &file.node.key_path,
            config.rpc_timeout(),
        )?;
        let actuator = Arc::new(RecoveryService::new(
            &file.node.restart_command,
            file.node.restart_working_dir(),
            file.node.restart_timeout(),
        ));
        let sync_monitor = SyncMonitor::new(
            name,
            &config.machine_name,
            Arc::new(chain),
            notifier.clone(),
            actuator,
            settings,
        );
        board.insert(sync_monitor.name(), sync_monitor.subscribe());
        tasks.push(tokio::spawn(sync_monitor.run(cancel.clone())));

        if let Some(farmer) = &file.farmer {
            let farmer_rpc = RpcClient::new(
                &farmer.farmer_url,
                &farmer.cert_path,
                &farmer.key_path,
                config.rpc_timeout(),
            )?;
            let harvester_monitor = HarvesterMonitor::new(
                &format!("{}-harvesters", name),
                &config.machine_name,
                Arc::new(farmer_rpc),
                Arc::new(DnsResolver),
                notifier.clone(),
                farmer.expected_harvesters.clone(),
                OfflineFlag::new(&farmer.offline_flag_path),
                config.farmer_interval(),
            );
            board.insert(harvester_monitor.name(), harvester_monitor.subscribe());
            tasks.push(tokio::spawn(harvester_monitor.run(cancel.clone())));
        }

        let wallet = match &file.wallet {
            Some(wallet) => Some(WalletTarget {
                rpc: Arc::new(RpcClient::new(
                    &wallet.wallet_url,
                    &wallet.cert_path,
                    &wallet.key_path,
                    config.rpc_timeout(),
                )?),
                wallet_id: wallet.wallet_id,
            }),
            None => None,
        };
        let pool = file.pool.as_ref().map(PoolService::new).transpose()?;
        targets.push(ReportTarget {
            node: name.clone(),
            wallet,
            pool,
        });
    }

    if board.is_empty() {
        warn!("No enabled nodes configured - nothing to monitor");
    }
    info!("Started {} monitors", board.len());

    let reporter = Arc::new(PeriodicReporter::new(
        &config.machine_name,
        notifier.clone(),
        targets,
    ));
    let mut report_scheduler =
        ReportScheduler::new(reporter, &config.daily_cron, config.timezone.as_deref()).await?;
    report_scheduler.start().await?;

    let state = AppState::new(config.clone(), board, notifier.clone());
    let web_cancel = cancel.clone();
    let web_task = tokio::spawn(async move {
        if let Err(e) = start_web_server(state, web_cancel).await {
            error!("Status API failed: {}", e);
        }
    });
    tasks.push(web_task);

    wait_for_shutdown().await;
    info!("Shutdown requested, stopping monitors");
    cancel.cancel();

    for result in join_all(tasks).await {
        if let Err(e) = result {
            error!("Task ended abnormally: {}", e);
        }
    }

    if let Err(e) = report_scheduler.shutdown().await {
        error!("{}", e);
    }

    info!("Farm monitor stopped");
    Ok(())
}

async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = terminate.recv() => {}
                }
            }
            Err(e) => {
                warn!("SIGTERM handler unavailable: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
