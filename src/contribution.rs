//! Contribution kinds and the point table
//!
//! Each kind is minted as its own ERC-1155 token id. The weights must match
//! the ones the badge contract assigns; nothing here can detect drift.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContributionKind {
    Attend,
    Host,
    Pace,
    Supplies,
}

impl ContributionKind {
    pub fn all() -> [ContributionKind; 4] {
        [
            ContributionKind::Attend,
            ContributionKind::Host,
            ContributionKind::Pace,
            ContributionKind::Supplies,
        ]
    }

    /// ERC-1155 token id the contract mints for this kind
    pub fn token_id(&self) -> u64 {
        match self {
            ContributionKind::Attend => 1,
            ContributionKind::Host => 2,
            ContributionKind::Pace => 3,
            ContributionKind::Supplies => 4,
        }
    }

    pub fn from_token_id(id: u64) -> Option<Self> {
        match id {
            1 => Some(ContributionKind::Attend),
            2 => Some(ContributionKind::Host),
            3 => Some(ContributionKind::Pace),
            4 => Some(ContributionKind::Supplies),
            _ => None,
        }
    }

    pub fn points(&self) -> u64 {
        match self {
            ContributionKind::Attend => 10,
            ContributionKind::Host => 50,
            ContributionKind::Pace => 20,
            ContributionKind::Supplies => 15,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContributionKind::Attend => "attend",
            ContributionKind::Host => "host",
            ContributionKind::Pace => "pace",
            ContributionKind::Supplies => "supplies",
        }
    }
}

impl fmt::Display for ContributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContributionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "attend" => Ok(ContributionKind::Attend),
            "host" => Ok(ContributionKind::Host),
            "pace" => Ok(ContributionKind::Pace),
            "supplies" | "supply" => Ok(ContributionKind::Supplies),
            other => Err(format!(
                "unknown contribution '{}' (expected attend, host, pace or supplies)",
                other
            )),
        }
    }
}

/// Token id -> points, as exposed by the debug endpoint
pub fn point_table() -> Vec<(u64, u64)> {
    ContributionKind::all()
        .iter()
        .map(|k| (k.token_id(), k.points()))
        .collect()
}

/// Per-kind counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributions {
    pub attend: u64,
    pub host: u64,
    pub pace: u64,
    pub supplies: u64,
}

impl Contributions {
    pub fn record(&mut self, kind: ContributionKind) {
        match kind {
            ContributionKind::Attend => self.attend += 1,
            ContributionKind::Host => self.host += 1,
            ContributionKind::Pace => self.pace += 1,
            ContributionKind::Supplies => self.supplies += 1,
        }
    }

    pub fn count(&self, kind: ContributionKind) -> u64 {
        match kind {
            ContributionKind::Attend => self.attend,
            ContributionKind::Host => self.host,
            ContributionKind::Pace => self.pace,
            ContributionKind::Supplies => self.supplies,
        }
    }

    /// Weighted sum under the point table
    pub fn points(&self) -> u64 {
        ContributionKind::all()
            .iter()
            .map(|k| self.count(*k) * k.points())
            .sum()
    }
}
