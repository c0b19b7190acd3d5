use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use alcides::{
    config::Config,
    rundeck::RundeckClient,
    server::{Credential, Server},
};

/// Relays Alertmanager webhooks to Rundeck job runs.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Listen address, overrides SERVER_ADDR
    #[arg(long)]
    addr: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Missing tokens or an unusable Rundeck URL end the process here
    let mut config = Config::load().inspect_err(|e| error!(error = %e, "Invalid configuration"))?;
    if let Some(addr) = args.addr {
        config.server.addr = addr;
    }
    info!(rundeck_url = %config.rundeck.url, api_version = %config.rundeck.api_version, "Loaded configuration");

    let rundeck = RundeckClient::new(&config.rundeck)
        .inspect_err(|e| error!(error = %e, "Cannot build rundeck client"))?;

    let server = Server::new(Credential::new(config.relay.secret), Arc::new(rundeck))?
        .with_body_limit(config.server.max_body_bytes);

    info!("Starting server on {}", config.server.addr);
    server.start(&config.server.addr).await?;

    Ok(())
}
