//! Log subscriber setup: stdout always, plus daily rotated files when
//! `log_dir` is configured.

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::constants::logging;

/// `monitor=info`, or `monitor=debug` when `log_production = false`.
/// `RUST_LOG` directives are kept.
pub fn env_filter(config: &Config) -> Result<EnvFilter> {
    let level = if config.log_production.unwrap_or(true) {
        "monitor=info"
    } else {
        "monitor=debug"
    };
    Ok(EnvFilter::from_default_env()
        .add_directive(level.parse()?)
        .add_directive("farm_monitor=info".parse()?)
        .add_directive("tower_http=warn".parse()?)
        .add_directive("tokio_cron_scheduler=warn".parse()?)
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?))
}

/// One file per day under `dir`; files beyond `retention_days` are pruned
pub fn file_appender(dir: &str, retention_days: u32) -> Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(logging::FILE_PREFIX)
        .filename_suffix(logging::FILE_SUFFIX)
        .max_log_files(retention_days.max(1) as usize)
        .build(dir)
        .with_context(|| format!("Failed to open log directory '{}'", dir))
}

/// Install the global subscriber. Hold the returned guard until exit so
/// buffered file lines are flushed.
pub fn init(config: &Config) -> Result<Option<WorkerGuard>> {
    let filter = env_filter(config)?;

    match &config.log_dir {
        Some(dir) => {
            let appender = file_appender(dir, config.log_retention_days())?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer())
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer())
                .init();
            Ok(None)
        }
    }
}
