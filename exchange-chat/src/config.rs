//! Runtime settings for the relay and the rate provider.

use std::{net::SocketAddr, path::PathBuf, time::Duration};

pub const DEFAULT_LISTEN: &str = "127.0.0.1:8080";
pub const DEFAULT_BASE_URL: &str = "https://api.privatbank.ua/p24api/exchange_rates";
pub const DEFAULT_COMMAND_LOG: &str = "logs.txt";
pub const DEFAULT_CURRENCIES: [&str; 2] = ["EUR", "USD"];

/// Upper bound on the number of days a single request may cover.
pub const MAX_DAYS: u32 = 10;

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub listen: SocketAddr,
    pub provider: ProviderConfig,
    /// Cap applied to day counts parsed out of chat messages.
    pub max_days: u32,
    pub command_log: PathBuf,
    /// Also broadcast the raw exchange command line before its result.
    pub echo_commands: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 8080)),
            provider: ProviderConfig::default(),
            max_days: MAX_DAYS,
            command_log: PathBuf::from(DEFAULT_COMMAND_LOG),
            echo_commands: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    pub currencies: Vec<String>,
    /// Applies to each individual upstream request.
    pub timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            currencies: tracked_currencies(&[]),
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

/// Default currencies followed by `extra`, upper-cased and without repeats.
pub fn tracked_currencies(extra: &[String]) -> Vec<String> {
    let mut currencies: Vec<String> = Vec::with_capacity(DEFAULT_CURRENCIES.len() + extra.len());
    let candidates = DEFAULT_CURRENCIES
        .iter()
        .map(|code| code.to_string())
        .chain(extra.iter().map(|code| code.trim().to_ascii_uppercase()));

    for code in candidates {
        if !code.is_empty() && !currencies.contains(&code) {
            currencies.push(code);
        }
    }
    currencies
}
