//! `rates` subcommand: fetch and print a rate table without the relay.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{self, AsyncWriteExt};

use crate::{
    cli::RatesArgs,
    command::{DayCount, DayCountError},
    config::MAX_DAYS,
    rates::{PrivatBankClient, RateAggregator, RateProvider, RateReport, format::render_report},
};

pub async fn run(args: RatesArgs) -> Result<()> {
    let config = args.provider_config();
    let provider = Arc::new(PrivatBankClient::new(&config)?);

    let report = fetch_rates(args.days, provider).await?;

    let output = if args.json {
        serde_json::to_string_pretty(&report).context("failed to encode rates as JSON")?
    } else {
        render_report(&report, &config.currencies)
    };
    write_stdout(&output).await?;

    if !report.is_complete() {
        tracing::warn!(missing = ?report.missing(), "no rates for some days");
    }
    Ok(())
}

/// Checks `days` against the standalone bound before any request is made,
/// then aggregates.
pub async fn fetch_rates(
    days: i64,
    provider: Arc<dyn RateProvider>,
) -> Result<RateReport, DayCountError> {
    let days = DayCount::bounded(days, MAX_DAYS)?;
    Ok(RateAggregator::new(provider).aggregate(days).await)
}

async fn write_stdout(text: &str) -> io::Result<()> {
    let mut stdout = io::stdout();
    stdout.write_all(text.trim_end().as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await
}
