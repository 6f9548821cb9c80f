//! Log command - record a contribution in the local journal

use crate::style::*;
use anyhow::Result;
use stride_leaderboard::{journal::JournalError, ContributionKind};

pub fn run(kind: ContributionKind, journal: Option<&str>) -> Result<()> {
    let store = super::journal_store(journal);
    let today = chrono::Local::now().date_naive();

    match store.record(kind, today) {
        Ok((totals, earned)) => {
            say_ok(&format!(
                "Recorded {} (+{} points, {} total)",
                paint(Tone::Bold, kind.as_str()),
                kind.points(),
                totals.points
            ));
            if kind == ContributionKind::Attend {
                println!("  Streak: {} day(s)", paint(Tone::Cyan, &totals.streak.to_string()));
            }
            for badge in earned {
                println!("  New badge: {}", paint(Tone::Yellow, &badge));
            }
            Ok(())
        }
        Err(JournalError::AlreadyRecorded(kind)) => {
            say_warn(&format!("{} already recorded today", kind));
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
