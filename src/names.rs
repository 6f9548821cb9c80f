//! Display-name resolution for participant addresses
//!
//! Lookup order: manual mapping, cached result, remote basename API. Misses
//! and errors are cached too, so each address hits the network at most once
//! per process.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::NamesConfig;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Shorten an address for display: `0x1234...abcd`
pub fn format_address(address: &str) -> String {
    if address.len() <= 10 || !address.is_ascii() {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}

/// `0x` followed by 40 hex digits
pub fn is_address(value: &str) -> bool {
    value.len() == 42
        && (value.starts_with("0x") || value.starts_with("0X"))
        && value[2..].bytes().all(|b| b.is_ascii_hexdigit())
}

/// True for Base names (`alice.base.eth`, `alice.basetest.eth`)
pub fn is_basename(name: &str) -> bool {
    name.contains(".base.eth") || name.contains(".basetest.eth")
}

#[derive(Debug, Deserialize)]
struct NameResponse {
    #[serde(default)]
    name: Option<String>,
}

pub struct NameResolver {
    client: Client,
    resolver_url: String,
    manual: HashMap<String, String>,
    cache: Mutex<HashMap<String, Option<String>>>,
}

impl NameResolver {
    pub fn new(resolver_url: impl Into<String>, manual: HashMap<String, String>) -> Self {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            resolver_url: resolver_url.into().trim_end_matches('/').to_string(),
            manual: manual
                .into_iter()
                .map(|(address, name)| (address.to_lowercase(), name))
                .collect(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &NamesConfig) -> Self {
        Self::new(config.resolver_url.clone(), config.manual.clone())
    }

    pub fn manual_name(&self, address: &str) -> Option<&str> {
        self.manual.get(&address.to_lowercase()).map(String::as_str)
    }

    /// Known name without touching the network
    pub fn lookup(&self, address: &str) -> Option<String> {
        if let Some(name) = self.manual_name(address) {
            return Some(name.to_string());
        }
        self.cache.lock().get(&address.to_lowercase()).cloned().flatten()
    }

    /// Best display label for an address; never fails
    pub async fn resolve(&self, address: &str) -> String {
        if address.is_empty() {
            return String::new();
        }
        if let Some(name) = self.manual_name(address) {
            return name.to_string();
        }
        // Anything else never reaches the resolver or the cache
        if !is_address(address) {
            return format_address(address);
        }

        let key = address.to_lowercase();
        let cached = self.cache.lock().get(&key).cloned();
        if let Some(hit) = cached {
            return hit.unwrap_or_else(|| format_address(address));
        }

        let name = match self.fetch_name(address).await {
            Ok(name) => name,
            Err(e) => {
                warn!("Failed to resolve basename for {}: {}", address, e);
                None
            }
        };

        self.cache.lock().insert(key, name.clone());
        name.unwrap_or_else(|| format_address(address))
    }

    async fn fetch_name(&self, address: &str) -> anyhow::Result<Option<String>> {
        let url = format!("{}/v1/name/{}", self.resolver_url, address);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            debug!("No basename for {} ({})", address, response.status());
            return Ok(None);
        }

        let body: NameResponse = response.json().await?;
        Ok(body.name.filter(|n| !n.is_empty()))
    }
}
