//! Block explorer client for fetching contract event logs
//!
//! Talks to an Etherscan-compatible `getLogs` endpoint (BaseScan by default).
//! The API key is optional; without one the explorer applies its public
//! rate limit.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::decode::{LogEntry, TRANSFER_SINGLE_TOPIC};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("explorer returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("explorer error: {0}")]
    Api(String),
    #[error("unexpected payload: {0}")]
    Payload(String),
}

/// Anything that can produce the `TransferSingle` logs of a contract
#[async_trait]
pub trait LogSource: Send + Sync {
    async fn transfer_logs(&self, contract: &str) -> Result<Vec<LogEntry>, FetchError>;
}

/// Envelope shared by every explorer API action
#[derive(Debug, Deserialize)]
struct ExplorerResponse {
    status: String,
    #[serde(default)]
    message: String,
    /// Log array on success, an error string otherwise
    #[serde(default)]
    result: serde_json::Value,
}

pub struct ExplorerClient {
    client: Client,
    api_url: String,
    api_key: Option<String>,
    page_size: u32,
}

impl ExplorerClient {
    pub fn new(api_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self::with_timeout(api_url, api_key, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        api_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        if api_key.is_some() {
            info!("Explorer client initialized with API key");
        } else {
            warn!("Explorer client initialized WITHOUT API key - public rate limits apply");
        }

        // Fall back to a default client if the builder fails
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_url: api_url.into(),
            api_key,
            page_size: 1000,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut client = Self::with_timeout(
            config.explorer.api_url.clone(),
            config.api_key(),
            config.request_timeout(),
        );
        client.page_size = config.explorer.page_size;
        client
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn log_query(&self, contract: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("module", "logs".to_string()),
            ("action", "getLogs".to_string()),
            ("address", contract.to_string()),
            ("topic0", TRANSFER_SINGLE_TOPIC.to_string()),
            ("fromBlock", "earliest".to_string()),
            ("toBlock", "latest".to_string()),
            ("page", "1".to_string()),
            ("offset", self.page_size.to_string()),
        ];
        if let Some(key) = &self.api_key {
            params.push(("apikey", key.clone()));
        }
        params
    }
}

/// Unwrap the explorer envelope into log entries
fn parse_logs(body: ExplorerResponse) -> Result<Vec<LogEntry>, FetchError> {
    if body.status != "1" {
        let detail = match body.result.as_str() {
            Some(result) if !result.is_empty() => format!("{} ({})", body.message, result),
            _ => body.message,
        };
        return Err(FetchError::Api(detail));
    }

    let raw: Vec<serde_json::Value> =
        serde_json::from_value(body.result).map_err(|e| FetchError::Payload(e.to_string()))?;

    // One bad element must not cost the rest of the batch
    let total = raw.len();
    let logs: Vec<LogEntry> = raw
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| match serde_json::from_value::<LogEntry>(value) {
            Ok(log) => Some(log),
            Err(e) => {
                warn!("Skipping malformed log #{}: {}", i, e);
                None
            }
        })
        .collect();

    if logs.len() < total {
        debug!("{} of {} logs were malformed", total - logs.len(), total);
    }
    Ok(logs)
}

#[async_trait]
impl LogSource for ExplorerClient {
    async fn transfer_logs(&self, contract: &str) -> Result<Vec<LogEntry>, FetchError> {
        debug!("Fetching TransferSingle logs for {}", contract);

        let response = self
            .client
            .get(&self.api_url)
            .query(&self.log_query(contract))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body: ExplorerResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Payload(e.to_string()))?;

        let logs = parse_logs(body)?;
        debug!("Explorer returned {} logs", logs.len());
        Ok(logs)
    }
}
