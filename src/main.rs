//! Stride Leaderboard Server
//!
//! Serves the badge leaderboard to the web front-end

use std::sync::Arc;

use stride_leaderboard::{Config, Leaderboard, NameResolver};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Stride leaderboard server");

    let config_path =
        std::env::var("STRIDE_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let config = Config::load_from(&config_path)?;

    match config.contract_address() {
        Some(address) => info!("Tracking badge contract {}", address),
        None => warn!("STRIDE_CONTRACT_ADDRESS not set - leaderboard disabled"),
    }

    let leaderboard = Arc::new(Leaderboard::from_config(&config));
    let names = Arc::new(NameResolver::from_config(&config.names));

    stride_leaderboard::server::run_server(
        &config.server.host,
        config.server.port,
        leaderboard,
        names,
    )
    .await?;

    Ok(())
}
