//! Debug command - show aggregator state

use crate::style::*;
use anyhow::Result;
use stride_leaderboard::Leaderboard;

pub async fn run(server: Option<&str>, config_path: &str) -> Result<()> {
    section("Leaderboard Debug Info");

    let info = match server {
        Some(url) => crate::client::StrideClient::new(url).get_debug().await?,
        None => {
            let config = super::load_config(config_path)?;
            let leaderboard = Leaderboard::from_config(&config);
            // Prime the cache so its state is worth reporting
            leaderboard.cached().await;
            serde_json::to_value(leaderboard.debug_info())?
        }
    };

    println!();
    println!(
        "Contract:         {}",
        paint(Tone::Cyan, info["contractAddress"].as_str().unwrap_or("(not configured)"))
    );
    println!(
        "API key:          {}",
        yes_no(info["hasApiKey"].as_bool().unwrap_or(false))
    );
    println!(
        "Event topic:      {}",
        paint(Tone::Dim, info["transferSingleTopic"].as_str().unwrap_or("?"))
    );

    if let Some(points) = info["pointValues"].as_object() {
        println!();
        println!("{}", paint(Tone::Bold, "Point values:"));
        for (token_id, value) in points {
            println!("  token {}:  {}", token_id, value);
        }
    }

    println!();
    println!("{}", paint(Tone::Bold, "Cache:"));
    match info["cacheStatus"].as_object() {
        Some(cache) => {
            println!("  Entries:  {}", cache["entries"]);
            println!("  Age:      {} ms", cache["ageMs"]);
            println!(
                "  Fresh:    {}",
                yes_no(cache["fresh"].as_bool().unwrap_or(false))
            );
        }
        None => println!("  {}", paint(Tone::Dim, "empty")),
    }

    Ok(())
}
