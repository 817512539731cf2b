//! In-memory counter store - used when Redis is not configured and in tests.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

use hirewire_core::ports::{CounterStore, CounterStoreError, WindowCounts};

struct CounterEntry {
    value: u64,
    expires_at: Option<Instant>,
}

impl CounterEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|exp| now >= exp)
    }
}

/// Counters in a HashMap behind an async RwLock.
///
/// Every mutation happens under the write lock, so increments are never lost
/// within one process. Limits are per-process, not shared across instances.
pub struct InMemoryCounterStore {
    store: RwLock<HashMap<String, CounterEntry>>,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
        }
    }

    /// Drop every expired counter. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut store = self.store.write().await;
        let before = store.len();
        store.retain(|_, entry| !entry.is_expired(now));
        let removed = before - store.len();

        tracing::debug!(removed, remaining = store.len(), "Counter purge complete");
        removed
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn increment_locked(store: &mut HashMap<String, CounterEntry>, key: &str, now: Instant) -> u64 {
        let entry = store.entry(key.to_string()).or_insert(CounterEntry {
            value: 0,
            expires_at: None,
        });
        if entry.is_expired(now) {
            entry.value = 0;
            entry.expires_at = None;
        }
        entry.value += 1;
        entry.value
    }
}

impl Default for InMemoryCounterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn increment(&self, key: &str) -> Result<u64, CounterStoreError> {
        let mut store = self.store.write().await;
        Ok(Self::increment_locked(&mut store, key, Instant::now()))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), CounterStoreError> {
        let mut store = self.store.write().await;
        if let Some(entry) = store.get_mut(key) {
            entry.expires_at = Some(Instant::now() + ttl);
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<u64>, CounterStoreError> {
        let store = self.store.read().await;
        Ok(store
            .get(key)
            .filter(|entry| !entry.is_expired(Instant::now()))
            .map(|entry| entry.value))
    }

    async fn hit_window(
        &self,
        current: &str,
        ttl: Duration,
        previous: Option<&str>,
    ) -> Result<WindowCounts, CounterStoreError> {
        let now = Instant::now();
        let mut store = self.store.write().await;

        let current_count = Self::increment_locked(&mut store, current, now);
        if let Some(entry) = store.get_mut(current) {
            entry.expires_at = Some(now + ttl);
        }

        let previous_count = previous
            .and_then(|key| store.get(key))
            .filter(|entry| !entry.is_expired(now))
            .map_or(0, |entry| entry.value);

        Ok(WindowCounts {
            current: current_count,
            previous: previous_count,
        })
    }
}
