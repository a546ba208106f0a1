use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, error, instrument};

use super::model::{CurrencyRate, DATE_FORMAT, DayRates, RateSnapshot};
use crate::config::ProviderConfig;

/// Source of one day's exchange rates. Failures are reported as `None`; the
/// caller decides what a missing day means.
#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn fetch_day(&self, date: NaiveDate) -> Option<DayRates>;
}

#[derive(Debug, Deserialize)]
struct ArchiveResponse {
    date: Option<String>,
    #[serde(rename = "exchangeRate")]
    exchange_rate: Vec<ArchiveRate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArchiveRate {
    currency: Option<String>,
    sale_rate: Option<f64>,
    purchase_rate: Option<f64>,
}

/// Client for the PrivatBank public exchange rate archive.
pub struct PrivatBankClient {
    client: reqwest::Client,
    base_url: String,
    currencies: Vec<String>,
}

impl PrivatBankClient {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("exchange-chat/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            currencies: config.currencies.clone(),
        })
    }
}

#[async_trait]
impl RateProvider for PrivatBankClient {
    #[instrument(name = "RateFetch", skip(self), fields(date = %date))]
    async fn fetch_day(&self, date: NaiveDate) -> Option<DayRates> {
        let requested = date.format(DATE_FORMAT).to_string();
        let url = format!("{}?json&date={}", self.base_url, requested);
        debug!("Requesting exchange rates from {}", url);

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(err) => {
                error!(error = %err, "Connection error");
                return None;
            }
        };

        if response.status() != StatusCode::OK {
            error!(status = %response.status(), "Error status");
            return None;
        }

        let body = match response.json::<ArchiveResponse>().await {
            Ok(body) => body,
            Err(err) => {
                error!(error = %err, "Failed to parse exchange rate response");
                return None;
            }
        };

        Some(DayRates {
            date: body.date.unwrap_or(requested),
            snapshot: snapshot_from(&body.exchange_rate, &self.currencies),
        })
    }
}

/// Keeps only the tracked currencies; a tracked entry without a sale or
/// purchase rate records "No data" for that side.
fn snapshot_from(rates: &[ArchiveRate], currencies: &[String]) -> RateSnapshot {
    let mut snapshot = RateSnapshot::default();
    for rate in rates {
        let Some(currency) = rate.currency.as_deref() else {
            continue;
        };
        if currencies.iter().any(|tracked| tracked == currency) {
            snapshot.insert(
                currency,
                CurrencyRate {
                    sale: rate.sale_rate.into(),
                    purchase: rate.purchase_rate.into(),
                },
            );
        }
    }
    snapshot
}
