//! Configuration management
//!
//! Loads configuration from config.toml with support for:
//! - Block explorer endpoint, badge contract and API key
//! - Leaderboard cache lifetime
//! - Server binding settings
//! - Display-name resolution (basename API and manual mapping)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

/// Main configuration structure matching config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub explorer: ExplorerConfig,
    #[serde(default)]
    pub leaderboard: LeaderboardConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub names: NamesConfig,
}

/// Block explorer (BaseScan / Etherscan-style) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorerConfig {
    pub api_url: String,
    /// Badge contract address. Empty disables the leaderboard.
    #[serde(default)]
    pub contract_address: String,
    #[serde(default)]
    pub api_key: String,
    /// Maximum number of logs requested in one query
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardConfig {
    pub cache_ttl_secs: u64,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Display-name resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamesConfig {
    pub resolver_url: String,
    /// Known address -> name pairs, checked before the remote resolver
    #[serde(default)]
    pub manual: HashMap<String, String>,
}

fn default_page_size() -> u32 {
    1000
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self { cache_ttl_secs: 60 }
    }
}

impl Default for NamesConfig {
    fn default() -> Self {
        Self {
            resolver_url: "https://api.basenames.org".to_string(),
            manual: HashMap::new(),
        }
    }
}

impl Config {
    /// Load from `path`, falling back to the embedded defaults, then apply
    /// environment overrides
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let mut config: Config = if path.exists() {
            let content = std::fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")?
        } else {
            // Use embedded default config
            toml::from_str(DEFAULT_CONFIG).context("Failed to parse default config")?
        };

        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Some(address) = non_empty_env("STRIDE_CONTRACT_ADDRESS") {
            self.explorer.contract_address = address;
        }
        if let Some(key) = non_empty_env("BASESCAN_API_KEY") {
            self.explorer.api_key = key;
        }
        if let Some(host) = non_empty_env("STRIDE_HOST") {
            self.server.host = host;
        }
        if let Some(port) = non_empty_env("STRIDE_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
    }

    /// Contract address, or None when the leaderboard is disabled
    pub fn contract_address(&self) -> Option<String> {
        let address = self.explorer.contract_address.trim();
        if address.is_empty() {
            None
        } else {
            Some(address.to_string())
        }
    }

    /// Explorer API key, if one is set
    pub fn api_key(&self) -> Option<String> {
        let key = self.explorer.api_key.trim();
        if key.is_empty() {
            None
        } else {
            Some(key.to_string())
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.leaderboard.cache_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.explorer.timeout_secs)
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

impl Default for Config {
    fn default() -> Self {
        // The embedded default config is part of the crate, so parsing only
        // fails if it was edited badly.
        toml::from_str(DEFAULT_CONFIG).unwrap_or_else(|_| Self {
            explorer: ExplorerConfig {
                api_url: "https://api.basescan.org/api".to_string(),
                contract_address: String::new(),
                api_key: String::new(),
                page_size: default_page_size(),
                timeout_secs: default_timeout_secs(),
            },
            leaderboard: LeaderboardConfig::default(),
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            names: NamesConfig::default(),
        })
    }
}
