//! Cron-based scheduling for the periodic farm reports
//!
//! The reporter sends a wallet balance notice and a pool earnings notice for
//! every node that configures them, once per firing of `daily_cron`.
//!
//! # Configuration
//!
//! `config/main.toml`:
//!
//! ```toml
//! daily_cron = "0 0 9 * * *"   # sec min hour day month dow
//! timezone = "Asia/Shanghai"   # optional, server local time otherwise
//! ```

pub mod operations;
pub mod reporter;

pub use operations::ReportScheduler;
pub use reporter::{PeriodicReporter, ReportTarget, WalletTarget};

use anyhow::{anyhow, Result};

/// Check a 6-field cron expression (sec min hour day month dow)
pub fn validate_cron(schedule: &str) -> Result<()> {
    let parts: Vec<&str> = schedule.split_whitespace().collect();

    if parts.len() != 6 {
        return Err(anyhow!(
            "expected 6 fields (sec min hour day month dow), got {} in '{}'",
            parts.len(),
            schedule
        ));
    }

    validate_cron_field(parts[0], "second", 0, 59)?;
    validate_cron_field(parts[1], "minute", 0, 59)?;
    validate_cron_field(parts[2], "hour", 0, 23)?;
    validate_cron_field(parts[3], "day", 1, 31)?;
    validate_cron_field(parts[4], "month", 1, 12)?;
    validate_cron_field(parts[5], "dayofweek", 0, 7)?;

    Ok(())
}

fn validate_cron_field(field: &str, name: &str, min: u32, max: u32) -> Result<()> {
    for part in field.split(',') {
        let (base, step) = match part.split_once('/') {
            Some((base, step)) => (base, Some(step)),
            None => (part, None),
        };

        if let Some(step) = step {
            let step = step
                .parse::<u32>()
                .map_err(|_| anyhow!("Invalid {} step value: {}", name, step))?;
            if step == 0 {
                return Err(anyhow!("{} step value cannot be 0", name));
            }
        }

        if base == "*" || base == "?" {
            continue;
        }

        let (start, end) = match base.split_once('-') {
            Some((start, end)) => (start, end),
            None => (base, base),
        };
        for value in [start, end] {
            let value = value
                .parse::<u32>()
                .map_err(|_| anyhow!("Invalid {} value: {}", name, value))?;
            if value < min || value > max {
                return Err(anyhow!(
                    "{} value {} is outside valid range {}-{}",
                    name,
                    value,
                    min,
                    max
                ));
            }
        }
    }

    Ok(())
}
