//! Leaderboard aggregation
//!
//! Builds the ranked participant list from badge mints:
//!
//! 1. Fetch every `TransferSingle` log of the badge contract (one page, up to
//!    the configured page size)
//! 2. Keep mints only (`from` is the zero address) so transfers between
//!    holders are never counted twice
//! 3. Sum points per recipient with the contribution point table
//! 4. Drop zero-point rows and sort by points, highest first
//!
//! Results are cached for a short TTL. When the explorer is unreachable the
//! caller gets a fixed demo dataset, tagged so it can tell the difference.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::cache::{Clock, SystemClock, TtlCache};
use crate::config::Config;
use crate::contribution::{point_table, Contributions};
use crate::decode::{decode_log, LogEntry, TRANSFER_SINGLE_TOPIC};
use crate::explorer::{ExplorerClient, FetchError, LogSource};

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub address: String,
    pub points: u64,
    pub contributions: Contributions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// False for demo rows shown when no chain data is available
    pub is_real_user: bool,
}

impl LeaderboardEntry {
    /// Zero-point row for a participant without any mints
    pub fn newcomer(address: &str) -> Self {
        Self {
            address: address.to_lowercase(),
            points: 0,
            contributions: Contributions::default(),
            display_name: None,
            is_real_user: true,
        }
    }
}

/// Why the demo dataset was served instead of chain data
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "lowercase")]
pub enum FallbackReason {
    Transport(String),
    Api(String),
    Payload(String),
}

impl From<&FetchError> for FallbackReason {
    fn from(err: &FetchError) -> Self {
        match err {
            FetchError::Http(e) => FallbackReason::Transport(e.to_string()),
            FetchError::Status(status) => FallbackReason::Transport(format!("HTTP {}", status)),
            FetchError::Api(msg) => FallbackReason::Api(msg.clone()),
            FetchError::Payload(msg) => FallbackReason::Payload(msg.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaderboardData {
    /// Decoded from chain logs
    Live(Vec<LeaderboardEntry>),
    /// Explorer failed; entries are the demo dataset
    Fallback {
        reason: FallbackReason,
        entries: Vec<LeaderboardEntry>,
    },
    /// No contract configured
    Disabled,
}

impl LeaderboardData {
    pub fn entries(&self) -> &[LeaderboardEntry] {
        match self {
            LeaderboardData::Live(entries) => entries,
            LeaderboardData::Fallback { entries, .. } => entries,
            LeaderboardData::Disabled => &[],
        }
    }

    pub fn mode(&self) -> &'static str {
        match self {
            LeaderboardData::Live(_) => "live",
            LeaderboardData::Fallback { .. } => "fallback",
            LeaderboardData::Disabled => "disabled",
        }
    }
}

/// Fixed rows shown when the explorer cannot be queried
pub fn fallback_entries() -> Vec<LeaderboardEntry> {
    let demo = |address: &str, name: &str, attend, host, pace, supplies| {
        let contributions = Contributions {
            attend,
            host,
            pace,
            supplies,
        };
        LeaderboardEntry {
            address: address.to_string(),
            points: contributions.points(),
            contributions,
            display_name: Some(name.to_string()),
            is_real_user: false,
        }
    };

    vec![
        demo("0x1234567890123456789012345678901234567890", "Demo User 1", 5, 1, 1, 0),
        demo("0x2345678901234567890123456789012345678901", "Demo User 2", 6, 0, 1, 1),
        demo("0x3456789012345678901234567890123456789012", "Demo User 3", 5, 0, 0, 2),
    ]
}

/// Aggregate raw logs into ranked entries. Undecodable logs are skipped.
pub fn aggregate_logs(logs: &[LogEntry]) -> Vec<LeaderboardEntry> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut entries: Vec<LeaderboardEntry> = Vec::new();
    let mut skipped = 0usize;

    for log in logs {
        let event = match decode_log(log) {
            Ok(event) => event,
            Err(e) if e.is_benign() => {
                trace!("Ignoring log: {}", e);
                continue;
            }
            Err(e) => {
                warn!(
                    "Skipping undecodable log (tx {}): {}",
                    log.transaction_hash.as_deref().unwrap_or("?"),
                    e
                );
                skipped += 1;
                continue;
            }
        };

        let slot = *index.entry(event.recipient.clone()).or_insert_with(|| {
            entries.push(LeaderboardEntry::newcomer(&event.recipient));
            entries.len() - 1
        });

        let entry = &mut entries[slot];
        entry.points += event.kind.points();
        entry.contributions.record(event.kind);
    }

    if skipped > 0 {
        debug!("{} of {} logs could not be decoded", skipped, logs.len());
    }

    entries.retain(|e| e.points > 0);
    // sort_by is stable: ties keep first-seen order
    entries.sort_by(|a, b| b.points.cmp(&a.points));
    entries
}

/// Current user merged into a leaderboard snapshot
pub fn with_current_user(
    entries: &[LeaderboardEntry],
    current_user: Option<&str>,
) -> Vec<LeaderboardEntry> {
    let Some(user) = current_user.filter(|u| !u.is_empty()) else {
        return entries.to_vec();
    };

    if entries.iter().any(|e| e.address.eq_ignore_ascii_case(user)) {
        return entries.to_vec();
    }

    let mut merged = entries.to_vec();
    let newcomer = LeaderboardEntry::newcomer(user);

    if entries.iter().any(|e| e.is_real_user) {
        merged.push(newcomer);
    } else if let Some(last) = merged.last_mut() {
        // Demo data only: make room so the user still sees themselves
        *last = newcomer;
    }

    merged
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    pub entries: usize,
    pub age_ms: u64,
    pub fresh: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    pub contract_address: Option<String>,
    pub has_api_key: bool,
    pub transfer_single_topic: &'static str,
    pub point_values: BTreeMap<u64, u64>,
    pub cache_status: Option<CacheStatus>,
}

/// Settings the aggregator needs besides its log source
#[derive(Debug, Clone)]
pub struct LeaderboardSettings {
    pub contract_address: Option<String>,
    pub has_api_key: bool,
    pub cache_ttl: Duration,
}

impl Default for LeaderboardSettings {
    fn default() -> Self {
        Self {
            contract_address: None,
            has_api_key: false,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

pub struct Leaderboard {
    source: Arc<dyn LogSource>,
    settings: LeaderboardSettings,
    cache: TtlCache<String, LeaderboardData>,
}

impl Leaderboard {
    pub fn new(
        source: Arc<dyn LogSource>,
        settings: LeaderboardSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            source,
            settings,
            cache: TtlCache::new(clock),
        }
    }

    /// Explorer-backed leaderboard with the system clock
    pub fn from_config(config: &Config) -> Self {
        let client = ExplorerClient::from_config(config);
        let settings = LeaderboardSettings {
            contract_address: config.contract_address(),
            has_api_key: client.has_api_key(),
            cache_ttl: config.cache_ttl(),
        };
        Self::new(Arc::new(client), settings, Arc::new(SystemClock))
    }

    fn cache_key(&self) -> String {
        self.settings
            .contract_address
            .as_deref()
            .unwrap_or_default()
            .to_lowercase()
    }

    /// Query the explorer and aggregate, bypassing the cache. Never fails.
    pub async fn fetch(&self) -> LeaderboardData {
        let Some(contract) = self.settings.contract_address.as_deref() else {
            warn!("Contract address not configured, leaderboard disabled");
            return LeaderboardData::Disabled;
        };

        match self.source.transfer_logs(contract).await {
            Ok(logs) => {
                let entries = aggregate_logs(&logs);
                info!(
                    "Leaderboard loaded: {} entries from {} logs",
                    entries.len(),
                    logs.len()
                );
                LeaderboardData::Live(entries)
            }
            Err(e) => {
                warn!("Leaderboard fetch failed, serving demo data: {}", e);
                LeaderboardData::Fallback {
                    reason: FallbackReason::from(&e),
                    entries: fallback_entries(),
                }
            }
        }
    }

    /// Cached snapshot, re-fetched once older than the TTL
    pub async fn cached(&self) -> Arc<LeaderboardData> {
        let key = self.cache_key();
        if let Some(data) = self.cache.get(&key) {
            return data;
        }

        let data = self.fetch().await;
        self.cache.set(key, data, self.settings.cache_ttl)
    }

    /// Cached leaderboard with the current user guaranteed to be visible
    pub async fn enhanced(&self, current_user: Option<&str>) -> Vec<LeaderboardEntry> {
        let data = self.cached().await;
        with_current_user(data.entries(), current_user)
    }

    pub fn debug_info(&self) -> DebugInfo {
        let cache_status = self.cache.peek(&self.cache_key()).map(|info| CacheStatus {
            entries: info.value.entries().len(),
            age_ms: info.age.as_millis() as u64,
            fresh: info.fresh,
        });

        DebugInfo {
            contract_address: self.settings.contract_address.clone(),
            has_api_key: self.settings.has_api_key,
            transfer_single_topic: TRANSFER_SINGLE_TOPIC,
            point_values: point_table().into_iter().collect(),
            cache_status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::tests::ManualClock;
    use crate::contribution::ContributionKind;
    use crate::decode::tests::{mint_log, transfer_log};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    const ALICE: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const BOB: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
    const CAROL: &str = "0xcccccccccccccccccccccccccccccccccccccccc";

    /// Canned explorer responses, counting calls
    struct FakeSource {
        response: Mutex<Result<Vec<LogEntry>, String>>,
        calls: Mutex<usize>,
    }

    impl FakeSource {
        fn ok(logs: Vec<LogEntry>) -> Arc<Self> {
            Arc::new(Self {
                response: Mutex::new(Ok(logs)),
                calls: Mutex::new(0),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                response: Mutex::new(Err(message.to_string())),
                calls: Mutex::new(0),
            })
        }

        fn calls(&self) -> usize {
            *self.calls.lock()
        }

        fn set_logs(&self, logs: Vec<LogEntry>) {
            *self.response.lock() = Ok(logs);
        }
    }

    #[async_trait]
    impl LogSource for FakeSource {
        async fn transfer_logs(&self, _contract: &str) -> Result<Vec<LogEntry>, FetchError> {
            *self.calls.lock() += 1;
            match &*self.response.lock() {
                Ok(logs) => Ok(logs.clone()),
                Err(msg) if msg == "status" => {
                    Err(FetchError::Status(reqwest::StatusCode::BAD_GATEWAY))
                }
                Err(msg) => Err(FetchError::Api(msg.clone())),
            }
        }
    }

    fn settings() -> LeaderboardSettings {
        LeaderboardSettings {
            contract_address: Some("0xC0FFEE0000000000000000000000000000000000".to_string()),
            has_api_key: true,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }

    fn leaderboard(source: Arc<FakeSource>, clock: Arc<ManualClock>) -> Leaderboard {
        Leaderboard::new(source, settings(), clock)
    }

    fn real(address: &str, points: u64) -> LeaderboardEntry {
        LeaderboardEntry {
            points,
            ..LeaderboardEntry::newcomer(address)
        }
    }

    #[test]
    fn test_same_recipient_accumulates() {
        let entries = aggregate_logs(&[mint_log(ALICE, 1), mint_log(ALICE, 2)]);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].address, ALICE);
        assert_eq!(entries[0].points, 60);
        assert_eq!(
            entries[0].contributions,
            Contributions {
                attend: 1,
                host: 1,
                pace: 0,
                supplies: 0
            }
        );
        assert!(entries[0].is_real_user);
    }

    #[test]
    fn test_transfers_are_not_counted() {
        let entries = aggregate_logs(&[
            mint_log(ALICE, 1),
            transfer_log(ALICE, BOB, 1),
            transfer_log(ALICE, BOB, 2),
        ]);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].address, ALICE);
        assert_eq!(entries[0].points, 10);
    }

    #[test]
    fn test_unknown_kinds_create_nothing() {
        let entries = aggregate_logs(&[mint_log(BOB, 0), mint_log(BOB, 9), mint_log(ALICE, 4)]);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].address, ALICE);
        assert_eq!(entries[0].contributions.supplies, 1);
    }

    #[test]
    fn test_malformed_log_does_not_abort_batch() {
        let mut broken = mint_log(BOB, 2);
        broken.data = "0xnothex".to_string();
        let entries = aggregate_logs(&[mint_log(ALICE, 3), broken, mint_log(CAROL, 1)]);
        let addresses: Vec<_> = entries.iter().map(|e| e.address.as_str()).collect();
        assert_eq!(addresses, vec![ALICE, CAROL]);
    }

    #[test]
    fn test_sorted_descending_with_stable_ties() {
        let entries = aggregate_logs(&[
            mint_log(ALICE, 1),
            mint_log(BOB, 2),
            mint_log(CAROL, 1),
            mint_log(ALICE, 4),
        ]);
        let ranked: Vec<_> = entries.iter().map(|e| (e.address.as_str(), e.points)).collect();
        assert_eq!(ranked, vec![(BOB, 50), (ALICE, 25), (CAROL, 10)]);

        let ties = aggregate_logs(&[mint_log(CAROL, 1), mint_log(ALICE, 1), mint_log(BOB, 1)]);
        let order: Vec<_> = ties.iter().map(|e| e.address.as_str()).collect();
        assert_eq!(order, vec![CAROL, ALICE, BOB]);
    }

    #[test]
    fn test_points_match_weighted_contributions() {
        let mut logs = Vec::new();
        for (i, kind) in ContributionKind::all().iter().cycle().take(23).enumerate() {
            let to = if i % 3 == 0 { ALICE } else { BOB };
            logs.push(mint_log(to, kind.token_id()));
        }
        let entries = aggregate_logs(&logs);
        assert!(!entries.is_empty());
        for entry in &entries {
            assert!(entry.points > 0);
            assert_eq!(entry.points, entry.contributions.points());
        }
        assert!(entries.windows(2).all(|w| w[0].points >= w[1].points));
    }

    #[test]
    fn test_fallback_dataset() {
        let entries = fallback_entries();
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|e| !e.is_real_user));
        assert!(entries.iter().all(|e| e.display_name.is_some()));
        let points: Vec<_> = entries.iter().map(|e| e.points).collect();
        assert_eq!(points, vec![120, 95, 80]);
        assert!(entries.windows(2).all(|w| w[0].points >= w[1].points));
    }

    #[test]
    fn test_fetch_disabled_without_contract() {
        let source = FakeSource::ok(vec![mint_log(ALICE, 1)]);
        let board = Leaderboard::new(
            source.clone(),
            LeaderboardSettings::default(),
            Arc::new(ManualClock::new()),
        );

        let data = tokio_test::block_on(board.fetch());
        assert_eq!(data, LeaderboardData::Disabled);
        assert!(data.entries().is_empty());
        assert_eq!(source.calls(), 0);
    }

    #[test]
    fn test_fetch_falls_back_on_failure() {
        let board = leaderboard(FakeSource::failing("status"), Arc::new(ManualClock::new()));
        match tokio_test::block_on(board.fetch()) {
            LeaderboardData::Fallback { reason, entries } => {
                assert_eq!(reason, FallbackReason::Transport("HTTP 502 Bad Gateway".into()));
                assert_eq!(entries, fallback_entries());
            }
            other => panic!("unexpected: {:?}", other),
        }

        let board = leaderboard(FakeSource::failing("NOTOK"), Arc::new(ManualClock::new()));
        let data = tokio_test::block_on(board.fetch());
        assert_eq!(data.mode(), "fallback");
        assert!(matches!(
            data,
            LeaderboardData::Fallback {
                reason: FallbackReason::Api(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_cache_hit_within_ttl() {
        let source = FakeSource::ok(vec![mint_log(ALICE, 1)]);
        let clock = Arc::new(ManualClock::new());
        let board = leaderboard(source.clone(), clock.clone());

        let first = board.cached().await;
        source.set_logs(vec![mint_log(BOB, 2)]);
        clock.advance(Duration::from_secs(59));
        let second = board.cached().await;

        assert_eq!(source.calls(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.entries()[0].address, ALICE);
    }

    #[tokio::test]
    async fn test_cache_refetches_after_ttl() {
        let source = FakeSource::ok(vec![mint_log(ALICE, 1)]);
        let clock = Arc::new(ManualClock::new());
        let board = leaderboard(source.clone(), clock.clone());

        board.cached().await;
        source.set_logs(vec![mint_log(BOB, 2)]);
        clock.advance(Duration::from_secs(60));

        let refreshed = board.cached().await;
        assert_eq!(source.calls(), 2);
        assert_eq!(refreshed.entries()[0].address, BOB);

        board.cached().await;
        assert_eq!(source.calls(), 2);
    }

    #[test]
    fn test_current_user_already_listed() {
        let base = vec![real(ALICE, 30), real(BOB, 10)];
        let merged = with_current_user(&base, Some("0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"));
        assert_eq!(merged, base);
        assert_eq!(with_current_user(&base, None), base);
    }

    #[test]
    fn test_current_user_appended_to_real_data() {
        let base = vec![real(ALICE, 30), real(BOB, 10)];
        let merged = with_current_user(&base, Some(CAROL));
        assert_eq!(merged.len(), 3);
        assert_eq!(&merged[..2], &base[..]);
        assert_eq!(merged[2], LeaderboardEntry::newcomer(CAROL));
    }

    #[test]
    fn test_current_user_replaces_last_demo_row() {
        let base = fallback_entries();
        let merged = with_current_user(&base, Some(CAROL));
        assert_eq!(merged.len(), base.len());
        assert_eq!(&merged[..2], &base[..2]);
        assert_eq!(merged[2].address, CAROL);
        assert_eq!(merged[2].points, 0);
        assert!(merged[2].is_real_user);

        assert!(with_current_user(&[], Some(CAROL)).is_empty());
    }

    #[tokio::test]
    async fn test_enhanced_on_fallback() {
        let board = leaderboard(FakeSource::failing("NOTOK"), Arc::new(ManualClock::new()));
        let entries = board.enhanced(Some(ALICE)).await;
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[2].address, ALICE);
        assert!(!entries[0].is_real_user);
    }

    #[tokio::test]
    async fn test_debug_info_tracks_cache() {
        let clock = Arc::new(ManualClock::new());
        let board = leaderboard(FakeSource::ok(vec![mint_log(ALICE, 1)]), clock.clone());

        let info = board.debug_info();
        assert!(info.cache_status.is_none());
        assert!(info.has_api_key);
        assert_eq!(info.transfer_single_topic, TRANSFER_SINGLE_TOPIC);
        assert_eq!(info.point_values.get(&2), Some(&50));
        assert_eq!(info.point_values.len(), 4);

        board.cached().await;
        clock.advance(Duration::from_millis(61_000));

        let status = board.debug_info().cache_status.unwrap();
        assert_eq!(status.entries, 1);
        assert_eq!(status.age_ms, 61_000);
        assert!(!status.fresh);
    }

    #[test]
    fn test_entry_serializes_camel_case() {
        let json = serde_json::to_value(real(ALICE, 10)).unwrap();
        assert_eq!(json["isRealUser"], true);
        assert_eq!(json["contributions"]["attend"], 0);
        assert!(json.get("displayName").is_none());
    }
}
