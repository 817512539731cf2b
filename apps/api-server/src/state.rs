//! Application state - shared across all handlers.

use std::sync::Arc;
use std::time::Duration;

use hirewire_core::domain::ProfileRegistry;
use hirewire_core::ports::{CounterStore, CounterStoreError};
use hirewire_core::{RequestEvaluator, SlidingWindowEvaluator, SystemClock};
use hirewire_infra::InMemoryCounterStore;

#[cfg(feature = "redis")]
use hirewire_infra::{RedisCounterStore, RedisCounterStoreConfig};

use crate::config::{AppConfig, RateLimitSettings};
use crate::routes;

const PURGE_INTERVAL: Duration = Duration::from_secs(300);

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub guard: RequestEvaluator,
    pub profiles: Arc<ProfileRegistry>,
    /// Which counter store backs the guard (`redis` or `memory`).
    pub store_backend: &'static str,
}

impl AppState {
    /// Build the application state, connecting the counter store.
    pub async fn new(config: &AppConfig) -> Result<Self, CounterStoreError> {
        let (store, store_backend) = build_store(&config.rate_limit).await?;
        let profiles = Arc::new(ProfileRegistry::standard());

        let state = Self::with_store(store, store_backend, profiles, &config.rate_limit);

        tracing::info!(
            store = state.store_backend,
            profiles = state.profiles.configs().len(),
            "Application state initialized"
        );

        Ok(state)
    }

    /// Wire the guard around an already-built store.
    pub fn with_store(
        store: Arc<dyn CounterStore>,
        store_backend: &'static str,
        profiles: Arc<ProfileRegistry>,
        settings: &RateLimitSettings,
    ) -> Self {
        let window = SlidingWindowEvaluator::new(store, Arc::new(SystemClock))
            .with_store_timeout(settings.store_timeout);
        let guard = RequestEvaluator::new(profiles.clone(), Arc::new(routes::route_table()), window);

        Self {
            guard,
            profiles,
            store_backend,
        }
    }
}

async fn build_store(
    settings: &RateLimitSettings,
) -> Result<(Arc<dyn CounterStore>, &'static str), CounterStoreError> {
    #[cfg(feature = "redis")]
    if let Some(redis) = &settings.redis {
        let config = RedisCounterStoreConfig {
            redis: redis.clone(),
            key_prefix: settings.key_prefix.clone(),
        };
        match RedisCounterStore::new(config).await {
            Ok(store) => return Ok((Arc::new(store), "redis")),
            Err(e) if redis.fallback_to_memory => {
                tracing::error!(
                    error = %e,
                    "Failed to connect to Redis. Rate limits fall back to per-process memory."
                );
            }
            Err(e) => return Err(e),
        }
    } else {
        tracing::warn!("REDIS_URL not set. Rate limits are per-process (in-memory mode).");
    }

    #[cfg(not(feature = "redis"))]
    tracing::info!(
        prefix = %settings.key_prefix,
        "Running without redis feature - using in-memory counters"
    );

    Ok((memory_store(), "memory"))
}

/// In-memory store with a background task dropping expired counters.
fn memory_store() -> Arc<dyn CounterStore> {
    let store = Arc::new(InMemoryCounterStore::new());

    let purger = store.clone();
    actix_rt::spawn(async move {
        let mut interval = tokio::time::interval(PURGE_INTERVAL);
        loop {
            interval.tick().await;
            purger.purge_expired().await;
        }
    });

    store
}
