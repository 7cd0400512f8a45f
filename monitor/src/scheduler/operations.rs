use anyhow::{anyhow, Result};
use chrono_tz::Tz;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{info, instrument, warn};

use super::reporter::PeriodicReporter;
use super::validate_cron;

pub struct ReportScheduler {
    reporter: Arc<PeriodicReporter>,
    schedule: String,
    timezone: Option<Tz>,
    scheduler: JobScheduler,
    started: bool,
}

impl ReportScheduler {
    pub async fn new(
        reporter: Arc<PeriodicReporter>,
        schedule: &str,
        timezone: Option<&str>,
    ) -> Result<Self> {
        validate_cron(schedule)
            .map_err(|e| anyhow!("Invalid 6-field cron schedule '{}': {}", schedule, e))?;

        let timezone = timezone
            .map(|tz| {
                tz.parse::<Tz>()
                    .map_err(|e| anyhow!("Invalid timezone '{}': {}", tz, e))
            })
            .transpose()?;

        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| anyhow!("Failed to create JobScheduler: {}", e))?;

        Ok(Self {
            reporter,
            schedule: schedule.to_string(),
            timezone,
            scheduler,
            started: false,
        })
    }

    #[instrument(skip(self))]
    pub async fn start(&mut self) -> Result<()> {
        if !self.reporter.has_targets() {
            warn!("No wallet or pool sections configured - report scheduler not started");
            return Ok(());
        }

        let reporter = self.reporter.clone();
        let job = match self.timezone {
            Some(tz) => Job::new_async_tz(self.schedule.as_str(), tz, move |_uuid, _scheduler| {
                report_task(reporter.clone())
            }),
            None => Job::new_async(self.schedule.as_str(), move |_uuid, _scheduler| {
                report_task(reporter.clone())
            }),
        }
        .map_err(|e| anyhow!("Failed to create report job for '{}': {}", self.schedule, e))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| anyhow!("Failed to add report job to scheduler: {}", e))?;
        self.scheduler
            .start()
            .await
            .map_err(|e| anyhow!("Failed to start scheduler: {}", e))?;
        self.started = true;

        info!(
            "Report scheduler started: '{}' ({})",
            self.schedule,
            self.timezone
                .map(|tz| tz.name().to_string())
                .unwrap_or_else(|| "local time".to_string())
        );
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        if !self.started {
            return Ok(());
        }
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| anyhow!("Failed to shut down scheduler: {}", e))?;
        self.started = false;
        info!("Report scheduler stopped");
        Ok(())
    }
}

fn report_task(reporter: Arc<PeriodicReporter>) -> Pin<Box<dyn Future<Output = ()> + Send>> {
    Box::pin(async move {
        info!("Executing scheduled farm report");
        reporter.report_once().await;
    })
}
