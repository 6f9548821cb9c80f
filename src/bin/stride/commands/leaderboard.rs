//! Leaderboard command

use crate::style::*;
use anyhow::Result;
use stride_leaderboard::{with_current_user, Leaderboard, LeaderboardEntry, NameResolver};

pub async fn run(
    server: Option<&str>,
    config_path: &str,
    limit: usize,
    address: Option<String>,
) -> Result<()> {
    section("Stride & Rise Leaderboard");

    let config = super::load_config(config_path)?;
    let names = NameResolver::from_config(&config.names);

    let (mode, entries) = match server {
        Some(url) => {
            let client = crate::client::StrideClient::new(url);
            let response = client.get_leaderboard(address.as_deref()).await?;
            (response.mode, response.leaderboard)
        }
        None => {
            let leaderboard = Leaderboard::from_config(&config);
            let data = leaderboard.cached().await;
            let entries = with_current_user(data.entries(), address.as_deref());
            (data.mode().to_string(), entries)
        }
    };

    match mode.as_str() {
        "disabled" => {
            say_info("Leaderboard disabled: no badge contract configured.");
            return Ok(());
        }
        "fallback" => say_warn("Explorer unavailable - showing demo data."),
        _ => {}
    }

    if entries.is_empty() {
        say_info("No badges minted yet.");
        return Ok(());
    }

    println!();
    println!(
        "{:>4}  {:<20}  {:>7}  {:>6}  {:>4}  {:>4}  {:>8}",
        "Rank", "Runner", "Points", "Attend", "Host", "Pace", "Supplies"
    );
    println!("{}", "─".repeat(66));

    for (i, entry) in entries.iter().take(limit).enumerate() {
        let rank = format!("#{}", i + 1);
        let rank_styled = if i == 0 {
            paint(Tone::Yellow, &rank)
        } else if i < 3 {
            paint(Tone::Cyan, &rank)
        } else {
            rank
        };

        let label = display_label(&names, entry).await;
        let is_me = address
            .as_deref()
            .is_some_and(|a| a.eq_ignore_ascii_case(&entry.address));
        let label = if is_me {
            paint(Tone::Bold, &format!("{} (you)", label))
        } else {
            runner_label(&label)
        };

        println!(
            "{:>4}  {:<20}  {:>7}  {:>6}  {:>4}  {:>4}  {:>8}",
            rank_styled,
            label,
            entry.points,
            entry.contributions.attend,
            entry.contributions.host,
            entry.contributions.pace,
            entry.contributions.supplies,
        );
    }

    println!();
    println!("Total runners: {}", entries.len());

    Ok(())
}

async fn display_label(names: &NameResolver, entry: &LeaderboardEntry) -> String {
    match &entry.display_name {
        Some(name) => name.clone(),
        None if entry.is_real_user => names.resolve(&entry.address).await,
        None => stride_leaderboard::format_address(&entry.address),
    }
}
