pub mod config;
pub mod debug;
pub mod leaderboard;
pub mod log;
pub mod totals;

use anyhow::Result;
use stride_leaderboard::{Config, JournalStore};

/// Load the config for in-process commands
pub fn load_config(path: &str) -> Result<Config> {
    Config::load_from(path)
}

pub fn journal_store(path: Option<&str>) -> JournalStore {
    match path {
        Some(path) => JournalStore::new(path),
        None => JournalStore::new(JournalStore::default_path()),
    }
}
