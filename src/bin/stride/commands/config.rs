//! Config command - show the effective configuration

use crate::style::*;
use anyhow::Result;

pub fn run(config_path: &str) -> Result<()> {
    section("Stride Configuration");

    let config = super::load_config(config_path)?;

    println!();
    println!("Explorer:         {}", paint(Tone::Cyan, &config.explorer.api_url));
    println!(
        "Contract:         {}",
        config
            .contract_address()
            .unwrap_or_else(|| paint(Tone::Yellow, "(not configured - leaderboard disabled)"))
    );
    println!("API key:          {}", yes_no(config.api_key().is_some()));
    println!("Page size:        {} logs", config.explorer.page_size);
    println!("Cache TTL:        {}s", config.leaderboard.cache_ttl_secs);
    println!(
        "Server:           {}:{}",
        config.server.host, config.server.port
    );
    println!("Name resolver:    {}", config.names.resolver_url);
    println!("Manual names:     {}", config.names.manual.len());

    Ok(())
}
