use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use exchange_chat::{
    cli::{Cli, Command},
    config::RelayConfig,
    server::RelayServer,
    standalone,
};

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve(args) => {
            let config = RelayConfig::from(&args);
            let server = RelayServer::bind(&config).await?;
            let addr = server.local_addr()?;
            info!("relay listening on ws://{}", addr);
            if let Err(err) = server.run_until_ctrl_c().await {
                warn!("relay exited with error: {err:?}");
                return Err(err);
            }
        }
        Command::Rates(args) => standalone::run(args).await?,
    }

    Ok(())
}
