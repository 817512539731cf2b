//! Atomic window counter port.

use async_trait::async_trait;
use std::time::Duration;

/// Counts read back from one sliding-window exchange.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowCounts {
    /// Current bucket, after this request's increment.
    pub current: u64,
    /// Previous bucket, 0 when absent or expired.
    pub previous: u64,
}

/// Counter store trait - any key-value store with atomic increment and TTL.
///
/// Increments from concurrent callers must never be lost.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Increment `key`, creating it at 1 if absent. Returns the new value.
    async fn increment(&self, key: &str) -> Result<u64, CounterStoreError>;

    /// Set (or reset) the time-to-live of `key`.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), CounterStoreError>;

    /// Read `key` without modifying it.
    async fn get(&self, key: &str) -> Result<Option<u64>, CounterStoreError>;

    /// Increment `current` with `ttl` and read `previous`.
    ///
    /// Adapters should override this to do all three in one round trip.
    async fn hit_window(
        &self,
        current: &str,
        ttl: Duration,
        previous: Option<&str>,
    ) -> Result<WindowCounts, CounterStoreError> {
        let current_count = self.increment(current).await?;
        self.expire(current, ttl).await?;
        let previous_count = match previous {
            Some(key) => self.get(key).await?.unwrap_or(0),
            None => 0,
        };

        Ok(WindowCounts {
            current: current_count,
            previous: previous_count,
        })
    }
}

/// Counter store errors.
#[derive(Debug, thiserror::Error)]
pub enum CounterStoreError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Operation failed: {0}")]
    Operation(String),

    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),
}
