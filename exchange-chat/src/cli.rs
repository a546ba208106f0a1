use std::{net::SocketAddr, path::PathBuf, time::Duration};

use clap::{Args, Parser, Subcommand};

use crate::config::{
    DEFAULT_BASE_URL, DEFAULT_COMMAND_LOG, DEFAULT_FETCH_TIMEOUT, DEFAULT_LISTEN, MAX_DAYS,
    ProviderConfig, RelayConfig, tracked_currencies,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the chat relay, accepting WebSocket connections.
    Serve(ServeArgs),
    /// Print exchange rates for the last few days and exit.
    Rates(RatesArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Socket address the relay should bind to. Use port 0 for an ephemeral port.
    #[arg(long, default_value = DEFAULT_LISTEN)]
    pub listen: SocketAddr,

    /// Base URL of the exchange rate archive.
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Extra currency code to track alongside EUR and USD. Repeatable.
    #[arg(long = "currency", value_name = "CODE")]
    pub currencies: Vec<String>,

    /// Largest day count a chat command may request.
    #[arg(long, default_value_t = MAX_DAYS)]
    pub max_days: u32,

    /// Timeout in seconds for each upstream rate request.
    #[arg(long, default_value_t = DEFAULT_FETCH_TIMEOUT.as_secs())]
    pub fetch_timeout: u64,

    /// File that receives one line per exchange command.
    #[arg(long, default_value = DEFAULT_COMMAND_LOG)]
    pub command_log: PathBuf,

    /// Broadcast the exchange command itself before the rates.
    #[arg(long)]
    pub echo_commands: bool,
}

#[derive(Args, Debug, Clone)]
pub struct RatesArgs {
    /// Number of days to fetch, counting back from today (1-10).
    #[arg(allow_negative_numbers = true)]
    pub days: i64,

    /// Extra currency codes appended to EUR and USD.
    #[arg(value_name = "CURRENCY")]
    pub currencies: Vec<String>,

    /// Base URL of the exchange rate archive.
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Timeout in seconds for each upstream rate request.
    #[arg(long, default_value_t = DEFAULT_FETCH_TIMEOUT.as_secs())]
    pub fetch_timeout: u64,

    /// Print the table as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

impl From<&ServeArgs> for RelayConfig {
    fn from(args: &ServeArgs) -> Self {
        Self {
            listen: args.listen,
            provider: ProviderConfig {
                base_url: args.base_url.clone(),
                currencies: tracked_currencies(&args.currencies),
                timeout: Duration::from_secs(args.fetch_timeout),
            },
            max_days: args.max_days,
            command_log: args.command_log.clone(),
            echo_commands: args.echo_commands,
        }
    }
}

impl RatesArgs {
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            base_url: self.base_url.clone(),
            currencies: tracked_currencies(&self.currencies),
            timeout: Duration::from_secs(self.fetch_timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_args_build_relay_config() {
        let cli = Cli::try_parse_from([
            "exchange-chat",
            "serve",
            "--listen",
            "0.0.0.0:9000",
            "--currency",
            "gbp",
            "--max-days",
            "5",
            "--echo-commands",
        ])
        .expect("valid serve arguments");

        let Command::Serve(args) = cli.command else {
            panic!("expected serve subcommand");
        };
        let config = RelayConfig::from(&args);
        assert_eq!(config.listen.port(), 9000);
        assert_eq!(config.provider.currencies, vec!["EUR", "USD", "GBP"]);
        assert_eq!(config.max_days, 5);
        assert!(config.echo_commands);
        assert_eq!(config.command_log, PathBuf::from(DEFAULT_COMMAND_LOG));
    }

    #[test]
    fn rates_accepts_negative_day_count_for_validation() {
        let cli = Cli::try_parse_from(["exchange-chat", "rates", "-3"]).expect("parse");
        let Command::Rates(args) = cli.command else {
            panic!("expected rates subcommand");
        };
        assert_eq!(args.days, -3);
    }

    #[test]
    fn fetch_timeout_defaults_to_config_value() {
        let cli = Cli::try_parse_from(["exchange-chat", "rates", "1"]).expect("parse");
        let Command::Rates(args) = cli.command else {
            panic!("expected rates subcommand");
        };
        assert_eq!(args.provider_config().timeout, DEFAULT_FETCH_TIMEOUT);

        let cli = Cli::try_parse_from(["exchange-chat", "serve"]).expect("parse");
        let Command::Serve(args) = cli.command else {
            panic!("expected serve subcommand");
        };
        assert_eq!(RelayConfig::from(&args).provider.timeout, DEFAULT_FETCH_TIMEOUT);
    }

    #[test]
    fn rates_requires_day_count() {
        assert!(Cli::try_parse_from(["exchange-chat", "rates"]).is_err());
    }

    #[test]
    fn rates_collects_extra_currencies() {
        let cli = Cli::try_parse_from(["exchange-chat", "rates", "2", "PLN", "CHF", "--json"])
            .expect("parse");
        let Command::Rates(args) = cli.command else {
            panic!("expected rates subcommand");
        };
        assert!(args.json);
        assert_eq!(
            args.provider_config().currencies,
            vec!["EUR", "USD", "PLN", "CHF"]
        );
    }
}
