//! Totals command - show the local journal

use crate::style::*;
use anyhow::Result;
use stride_leaderboard::ContributionKind;

pub fn run(journal: Option<&str>) -> Result<()> {
    section("Your Totals");

    let store = super::journal_store(journal);
    let totals = store.load()?;

    println!();
    println!("Points:           {}", paint(Tone::Bold, &totals.points.to_string()));
    println!("Attend streak:    {} day(s)", totals.streak);
    for kind in ContributionKind::all() {
        println!(
            "{:<17} {}",
            format!("{}:", kind),
            totals.contributions.count(kind)
        );
    }

    println!();
    if totals.badges.is_empty() {
        println!("Badges:           {}", paint(Tone::Dim, "none yet"));
    } else {
        println!("Badges:           {}", paint(Tone::Green, &totals.badges.join(", ")));
    }
    println!();
    println!("{}", paint(Tone::Dim, &format!("Journal: {}", store.path().display())));

    Ok(())
}
