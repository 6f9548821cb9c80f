//! Leaderboard server API client

use anyhow::{anyhow, Result};
use reqwest::Client;
use std::time::Duration;
use stride_leaderboard::server::LeaderboardResponse;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct StrideClient {
    client: Client,
    base_url: String,
}

impl StrideClient {
    pub fn new(server_url: &str) -> Self {
        // Build HTTP client with timeout, falling back to default client if builder fails
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: server_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Get the leaderboard, keeping `address` visible
    pub async fn get_leaderboard(&self, address: Option<&str>) -> Result<LeaderboardResponse> {
        let mut req = self.client.get(self.url("leaderboard"));
        if let Some(address) = address {
            req = req.query(&[("address", address)]);
        }
        let resp = req.send().await?;

        let status = resp.status();
        if status.is_success() {
            Ok(resp.json().await?)
        } else {
            let error_text = resp.text().await.unwrap_or_else(|_| "Unknown error".into());
            Err(anyhow!(
                "Failed to fetch leaderboard ({}): {}",
                status,
                error_text
            ))
        }
    }

    /// Get the aggregator debug record
    pub async fn get_debug(&self) -> Result<serde_json::Value> {
        let resp = self.client.get(self.url("leaderboard/debug")).send().await?;

        let status = resp.status();
        if status.is_success() {
            Ok(resp.json().await?)
        } else {
            let error_text = resp.text().await.unwrap_or_else(|_| "Unknown error".into());
            Err(anyhow!("Failed to fetch debug info ({}): {}", status, error_text))
        }
    }
}
