//! Stride Leaderboard Server
//!
//! HTTP endpoints consumed by the web front-end.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};

use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::leaderboard::{
    with_current_user, DebugInfo, FallbackReason, Leaderboard, LeaderboardData, LeaderboardEntry,
};
use crate::names::NameResolver;

pub struct AppState {
    pub leaderboard: Arc<Leaderboard>,
    pub names: Arc<NameResolver>,
    pub started_at: std::time::Instant,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/leaderboard", get(leaderboard_handler))
        .route("/leaderboard/debug", get(debug_handler))
        .route("/names/:address", get(name_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "healthy": true,
        "uptime_secs": state.started_at.elapsed().as_secs(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    /// Connected wallet, kept visible in the result
    pub address: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardResponse {
    /// live, fallback or disabled
    pub mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<serde_json::Value>,
    pub leaderboard: Vec<LeaderboardEntry>,
}

fn fallback_reason(data: &LeaderboardData) -> Option<&FallbackReason> {
    match data {
        LeaderboardData::Fallback { reason, .. } => Some(reason),
        _ => None,
    }
}

async fn leaderboard_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LeaderboardQuery>,
) -> Json<LeaderboardResponse> {
    let data = state.leaderboard.cached().await;
    let mut entries = with_current_user(data.entries(), query.address.as_deref());

    // Only names already known locally; remote lookups go through /names
    for entry in entries.iter_mut().filter(|e| e.display_name.is_none()) {
        entry.display_name = state.names.lookup(&entry.address);
    }

    Json(LeaderboardResponse {
        mode: data.mode().to_string(),
        fallback_reason: fallback_reason(&data).and_then(|r| serde_json::to_value(r).ok()),
        leaderboard: entries,
    })
}

async fn debug_handler(State(state): State<Arc<AppState>>) -> Json<DebugInfo> {
    Json(state.leaderboard.debug_info())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NameResponse {
    pub address: String,
    pub name: String,
}

async fn name_handler(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> Json<NameResponse> {
    let name = state.names.resolve(&address).await;
    Json(NameResponse { address, name })
}

/// Run the server
pub async fn run_server(
    host: &str,
    port: u16,
    leaderboard: Arc<Leaderboard>,
    names: Arc<NameResolver>,
) -> anyhow::Result<()> {
    let state = Arc::new(AppState {
        leaderboard,
        names,
        started_at: std::time::Instant::now(),
    });

    let app = create_router(state);
    let addr = format!("{}:{}", host, port);

    info!("Starting Stride leaderboard server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::SystemClock;
    use crate::decode::LogEntry;
    use crate::explorer::{FetchError, LogSource};
    use crate::leaderboard::LeaderboardSettings;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct Unreachable;

    #[async_trait]
    impl LogSource for Unreachable {
        async fn transfer_logs(&self, _contract: &str) -> Result<Vec<LogEntry>, FetchError> {
            Err(FetchError::Api("NOTOK".to_string()))
        }
    }

    fn state(contract: Option<&str>) -> Arc<AppState> {
        let settings = LeaderboardSettings {
            contract_address: contract.map(str::to_string),
            ..LeaderboardSettings::default()
        };
        let mut manual = HashMap::new();
        manual.insert(
            "0x1234567890123456789012345678901234567890".to_string(),
            "renamed".to_string(),
        );
        Arc::new(AppState {
            leaderboard: Arc::new(Leaderboard::new(
                Arc::new(Unreachable),
                settings,
                Arc::new(SystemClock),
            )),
            names: Arc::new(NameResolver::new("http://127.0.0.1:9", manual)),
            started_at: std::time::Instant::now(),
        })
    }

    #[tokio::test]
    async fn test_leaderboard_fallback_response() {
        let query = LeaderboardQuery {
            address: Some("0xDDDDDDDDDDDDDDDDDDDDDDDDDDDDDDDDDDDDDDDD".to_string()),
        };
        let Json(response) = leaderboard_handler(State(state(Some("0xc0ffee"))), Query(query)).await;

        assert_eq!(response.mode, "fallback");
        let reason = response.fallback_reason.unwrap();
        assert_eq!(reason["kind"], "api");
        assert_eq!(response.leaderboard.len(), 3);
        // demo rows keep their own names
        assert_eq!(
            response.leaderboard[0].display_name.as_deref(),
            Some("Demo User 1")
        );
        assert_eq!(
            response.leaderboard[2].address,
            "0xdddddddddddddddddddddddddddddddddddddddd"
        );
    }

    #[tokio::test]
    async fn test_leaderboard_response_is_camel_case() {
        let query = LeaderboardQuery { address: None };
        let Json(response) = leaderboard_handler(State(state(Some("0xc0ffee"))), Query(query)).await;

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["fallbackReason"]["kind"], "api");
        assert!(json.get("fallback_reason").is_none());
        assert!(json["leaderboard"][0].get("displayName").is_some());
    }

    #[tokio::test]
    async fn test_leaderboard_disabled_response() {
        let query = LeaderboardQuery { address: None };
        let Json(response) = leaderboard_handler(State(state(None)), Query(query)).await;
        assert_eq!(response.mode, "disabled");
        assert!(response.fallback_reason.is_none());
        assert!(response.leaderboard.is_empty());
    }

    #[tokio::test]
    async fn test_debug_handler() {
        let Json(info) = debug_handler(State(state(Some("0xc0ffee")))).await;
        assert_eq!(info.contract_address.as_deref(), Some("0xc0ffee"));
        assert!(info.cache_status.is_none());
    }

    #[tokio::test]
    async fn test_name_handler_uses_manual_mapping() {
        let Json(response) = name_handler(
            State(state(None)),
            Path("0x1234567890123456789012345678901234567890".to_string()),
        )
        .await;
        assert_eq!(response.name, "renamed");
    }
}
