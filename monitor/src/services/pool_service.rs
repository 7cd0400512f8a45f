//! Pool earnings lookups for the daily report

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{PoolConfig, PoolKind};
use crate::constants::report;

/// Yesterday's and today's running earnings, in coins
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolEarnings {
    pub yesterday: f64,
    pub today: f64,
}

#[derive(Debug, Deserialize)]
struct XchpoolDailyResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: String,
    #[serde(default)]
    result: Vec<XchpoolDay>,
}

#[derive(Debug, Deserialize)]
struct XchpoolDay {
    #[serde(default)]
    date: String,
    amount: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DpoolRewardRequest<'a> {
    launcher_id: &'a str,
    days: u32,
}

#[derive(Debug, Deserialize)]
struct DpoolRewardResponse {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Vec<DpoolRewardRecord>,
}

#[derive(Debug, Deserialize)]
struct DpoolRewardRecord {
    /// Mojo amount, sent as a decimal string
    amount: String,
}

#[derive(Clone)]
pub struct PoolService {
    kind: PoolKind,
    launcher_id: String,
    url: String,
    client: Client,
}

impl PoolService {
    pub fn new(config: &PoolConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(report::POOL_TIMEOUT)
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client for PoolService: {}", e))?;

        let url = config.api_url.clone().unwrap_or_else(|| match config.kind {
            PoolKind::Xchpool => report::XCHPOOL_DAILY_EARNINGS_URL.to_string(),
            PoolKind::Dpool => report::DPOOL_REWARD_URL.to_string(),
        });

        Ok(Self {
            kind: config.kind,
            launcher_id: config.launcher_id.clone(),
            url,
            client,
        })
    }

    pub fn kind(&self) -> PoolKind {
        self.kind
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn daily_earnings(&self) -> Result<PoolEarnings> {
        match self.kind {
            PoolKind::Xchpool => self.xchpool_earnings().await,
            PoolKind::Dpool => self.dpool_earnings().await,
        }
    }

    async fn xchpool_earnings(&self) -> Result<PoolEarnings> {
        info!("Fetching XCHPool earnings from {}", self.url);
        let body = self
            .client
            .get(&self.url)
            .query(&[("launcherId", self.launcher_id.as_str())])
            .send()
            .await
            .context("XCHPool request failed")?
            .text()
            .await
            .context("XCHPool response unreadable")?;
        debug!("XCHPool response: {}", body);

        parse_xchpool(&body)
    }

    async fn dpool_earnings(&self) -> Result<PoolEarnings> {
        let request = DpoolRewardRequest {
            launcher_id: &self.launcher_id,
            days: report::DPOOL_REWARD_DAYS,
        };
        info!("Fetching Dpool rewards from {}", self.url);
        let body = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .context("Dpool request failed")?
            .text()
            .await
            .context("Dpool response unreadable")?;
        debug!("Dpool response: {}", body);

        parse_dpool(&body)
    }
}

/// Days come oldest first; the last entry is today so far
fn parse_xchpool(body: &str) -> Result<PoolEarnings> {
    let response: XchpoolDailyResponse =
        serde_json::from_str(body).context("Unexpected XCHPool response")?;
    if !response.success {
        return Err(anyhow!("XCHPool reported failure: {}", response.message));
    }

    let days = &response.result;
    let today = days
        .last()
        .ok_or_else(|| anyhow!("XCHPool returned no earnings days"))?;
    let yesterday = days.len().checked_sub(2).map(|i| &days[i]);
    debug!(
        "XCHPool days: yesterday {:?}, today {}",
        yesterday.map(|d| d.date.as_str()),
        today.date
    );

    Ok(PoolEarnings {
        yesterday: yesterday.map(|d| d.amount).unwrap_or(0.0),
        today: today.amount,
    })
}

/// Records come newest first; the first entry is today so far
fn parse_dpool(body: &str) -> Result<PoolEarnings> {
    let response: DpoolRewardResponse =
        serde_json::from_str(body).context("Unexpected Dpool response")?;
    if response.code != 0 {
        return Err(anyhow!(
            "Dpool reported failure (code {}): {}",
            response.code,
            response.message
        ));
    }

    let today = response
        .data
        .first()
        .ok_or_else(|| anyhow!("Dpool returned no reward records"))?;
    let yesterday = match response.data.get(1) {
        Some(record) => mojo_to_coin(&record.amount)?,
        None => 0.0,
    };

    Ok(PoolEarnings {
        yesterday,
        today: mojo_to_coin(&today.amount)?,
    })
}

fn mojo_to_coin(amount: &str) -> Result<f64> {
    let mojo: u64 = amount
        .trim()
        .parse()
        .map_err(|_| anyhow!("Invalid Dpool amount: {:?}", amount))?;
    Ok(mojo as f64 / report::MOJO_PER_COIN)
}
