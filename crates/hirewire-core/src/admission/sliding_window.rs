//! Weighted two-bucket sliding window.
//!
//! Each key keeps one counter per fixed window. The previous window's count is
//! weighted by how much of it still overlaps a sliding window ending now, which
//! approximates a true sliding log with two integers per key.

use std::sync::Arc;
use std::time::Duration;

use crate::clock::Clock;
use crate::domain::{RateLimitCheckResult, RateLimitRule};
use crate::ports::{CounterStore, CounterStoreError, WindowCounts};

/// Default bound on one counter store exchange.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_millis(250);

/// Evaluates one rule against the shared counter store.
///
/// Stateless between calls; all shared state lives in the store.
#[derive(Clone)]
pub struct SlidingWindowEvaluator {
    store: Arc<dyn CounterStore>,
    clock: Arc<dyn Clock>,
    store_timeout: Duration,
}

impl SlidingWindowEvaluator {
    pub fn new(store: Arc<dyn CounterStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// Count this request against `key` under `rule`.
    ///
    /// Fails open: a store error or timeout yields an allowed result with the
    /// full budget remaining.
    pub async fn check(&self, key: &str, rule: &RateLimitRule) -> RateLimitCheckResult {
        let now = self.clock.now_millis();
        let window_ms = rule.window_millis();
        if window_ms == 0 {
            tracing::warn!(key = %key, "Rate limit rule has an empty window, failing open");
            return RateLimitCheckResult::fail_open(rule, 0, now);
        }

        let window_index = now / window_ms;
        let elapsed_ms = now % window_ms;
        let reset_in_seconds = (window_ms - elapsed_ms).div_ceil(1000);

        let current_key = format!("{key}:{window_index}");
        let previous_key = window_index
            .checked_sub(1)
            .map(|index| format!("{key}:{index}"));

        let counts = match self
            .hit(&current_key, rule.counter_ttl(), previous_key.as_deref())
            .await
        {
            Ok(counts) => counts,
            Err(e) => {
                tracing::warn!(
                    key = %key,
                    error = %e,
                    "Rate limit store unavailable, failing open"
                );
                return RateLimitCheckResult::fail_open(rule, reset_in_seconds, now);
            }
        };

        let window_progress = elapsed_ms as f64 / window_ms as f64;
        let weighted_count = weighted_count(counts, window_progress);
        let allowed = weighted_count <= rule.max;

        tracing::trace!(
            key = %key,
            current = counts.current,
            previous = counts.previous,
            weighted = weighted_count,
            max = rule.max,
            "Sliding window evaluated"
        );

        RateLimitCheckResult {
            allowed,
            current: weighted_count,
            limit: rule.max,
            remaining: rule.max.saturating_sub(weighted_count),
            reset_in_seconds,
            triggered_scope: (!allowed).then_some(rule.scope),
            evaluated_at: now,
        }
    }

    async fn hit(
        &self,
        current: &str,
        ttl: Duration,
        previous: Option<&str>,
    ) -> Result<WindowCounts, CounterStoreError> {
        tokio::time::timeout(self.store_timeout, self.store.hit_window(current, ttl, previous))
            .await
            .map_err(|_| CounterStoreError::Timeout(self.store_timeout))?
    }
}

/// `floor(current + previous × (1 − progress))`.
///
/// Floored: a fractional carry from the previous window never counts as a request.
fn weighted_count(counts: WindowCounts, window_progress: f64) -> u64 {
    let carried = counts.previous as f64 * (1.0 - window_progress);
    (counts.current as f64 + carried).floor() as u64
}
