//! Time-to-live cache with an injectable monotonic clock

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Monotonic time source
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct Slot<V> {
    value: Arc<V>,
    inserted_at: Instant,
    ttl: Duration,
}

/// Age and freshness of a cached value
#[derive(Debug, Clone)]
pub struct CacheEntryInfo<V> {
    pub value: Arc<V>,
    pub age: Duration,
    pub fresh: bool,
}

/// Values are replaced wholesale and handed out as shared snapshots.
pub struct TtlCache<K, V> {
    slots: Mutex<HashMap<K, Slot<V>>>,
    clock: Arc<dyn Clock>,
}

impl<K: Eq + Hash, V> TtlCache<K, V> {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Fresh value for `key`, or None if absent or expired
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let now = self.clock.now();
        let slots = self.slots.lock();
        slots
            .get(key)
            .filter(|slot| now.saturating_duration_since(slot.inserted_at) < slot.ttl)
            .map(|slot| slot.value.clone())
    }

    pub fn set(&self, key: K, value: V, ttl: Duration) -> Arc<V> {
        let value = Arc::new(value);
        let slot = Slot {
            value: value.clone(),
            inserted_at: self.clock.now(),
            ttl,
        };
        self.slots.lock().insert(key, slot);
        value
    }

    /// Inspect an entry whether or not it has expired
    pub fn peek(&self, key: &K) -> Option<CacheEntryInfo<V>> {
        let now = self.clock.now();
        let slots = self.slots.lock();
        slots.get(key).map(|slot| {
            let age = now.saturating_duration_since(slot.inserted_at);
            CacheEntryInfo {
                value: slot.value.clone(),
                age,
                fresh: age < slot.ttl,
            }
        })
    }
}
