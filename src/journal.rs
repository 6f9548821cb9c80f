//! Personal contribution journal
//!
//! Local bookkeeping for one participant: per-kind counts, points, the attend
//! streak and earned badges. Each kind can be recorded once per calendar day.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::contribution::{ContributionKind, Contributions};

pub const BADGE_FIRST_STRIDE: &str = "First Stride";
pub const BADGE_FIFTY_CLUB: &str = "50 Club";
pub const BADGE_FIRST_HOST: &str = "First Host";

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("{0} already recorded today")]
    AlreadyRecorded(ContributionKind),
    #[error("journal io: {0}")]
    Io(#[from] std::io::Error),
    #[error("journal format: {0}")]
    Format(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LastRecorded {
    pub attend: Option<NaiveDate>,
    pub host: Option<NaiveDate>,
    pub pace: Option<NaiveDate>,
    pub supplies: Option<NaiveDate>,
}

impl LastRecorded {
    fn get(&self, kind: ContributionKind) -> Option<NaiveDate> {
        match kind {
            ContributionKind::Attend => self.attend,
            ContributionKind::Host => self.host,
            ContributionKind::Pace => self.pace,
            ContributionKind::Supplies => self.supplies,
        }
    }

    fn set(&mut self, kind: ContributionKind, day: NaiveDate) {
        let slot = match kind {
            ContributionKind::Attend => &mut self.attend,
            ContributionKind::Host => &mut self.host,
            ContributionKind::Pace => &mut self.pace,
            ContributionKind::Supplies => &mut self.supplies,
        };
        *slot = Some(day);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Totals {
    pub contributions: Contributions,
    pub points: u64,
    pub badges: Vec<String>,
    pub streak: u32,
    pub last_recorded: LastRecorded,
}

impl Totals {
    pub fn can_record(&self, kind: ContributionKind, today: NaiveDate) -> Result<(), JournalError> {
        if self.last_recorded.get(kind) == Some(today) {
            return Err(JournalError::AlreadyRecorded(kind));
        }
        Ok(())
    }

    /// Record one contribution on `today`, returning the badges newly earned
    pub fn record(
        &mut self,
        kind: ContributionKind,
        today: NaiveDate,
    ) -> Result<Vec<String>, JournalError> {
        self.can_record(kind, today)?;

        let points = kind.points();
        let mut earned = Vec::new();

        match kind {
            ContributionKind::Attend => {
                let yesterday = today.pred_opt();
                self.streak = match self.last_recorded.attend {
                    Some(last) if Some(last) == yesterday => self.streak + 1,
                    _ => 1,
                };

                if self.contributions.attend == 0 {
                    self.award(BADGE_FIRST_STRIDE, &mut earned);
                }
                if self.points + points >= 50 {
                    self.award(BADGE_FIFTY_CLUB, &mut earned);
                }
            }
            ContributionKind::Host => self.award(BADGE_FIRST_HOST, &mut earned),
            ContributionKind::Pace | ContributionKind::Supplies => {}
        }

        self.contributions.record(kind);
        self.last_recorded.set(kind, today);
        self.points += points;

        debug!("Recorded {} (+{} points, streak {})", kind, points, self.streak);
        Ok(earned)
    }

    fn award(&mut self, badge: &str, earned: &mut Vec<String>) {
        if !self.badges.iter().any(|b| b == badge) {
            self.badges.push(badge.to_string());
            earned.push(badge.to_string());
        }
    }
}

/// Totals persisted as a JSON file
pub struct JournalStore {
    path: PathBuf,
}

impl JournalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.stride/journal.json`, or the working directory without a home
    pub fn default_path() -> PathBuf {
        std::env::var_os("HOME")
            .map(|home| Path::new(&home).join(".stride").join("journal.json"))
            .unwrap_or_else(|| PathBuf::from("stride-journal.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Totals, JournalError> {
        if !self.path.exists() {
            return Ok(Totals::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, totals: &Totals) -> Result<(), JournalError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(totals)?)?;
        info!("Journal saved to {}", self.path.display());
        Ok(())
    }

    /// Load, record and save in one step
    pub fn record(
        &self,
        kind: ContributionKind,
        today: NaiveDate,
    ) -> Result<(Totals, Vec<String>), JournalError> {
        let mut totals = self.load()?;
        let earned = totals.record(kind, today)?;
        self.save(&totals)?;
        Ok((totals, earned))
    }
}
