//! Redis counter store - window counters shared by every server instance.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use hirewire_core::ports::{CounterStore, CounterStoreError, WindowCounts};

/// Redis connection configuration.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis URL (e.g., redis://localhost:6379)
    pub url: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Whether to fall back to the in-memory store if Redis is unavailable at startup
    pub fallback_to_memory: bool,
}

impl RedisConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            connect_timeout: Duration::from_secs(
                std::env::var("REDIS_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            fallback_to_memory: std::env::var("REDIS_FALLBACK_TO_MEMORY")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
        }
    }
}

/// Redis counter store configuration.
#[derive(Debug, Clone)]
pub struct RedisCounterStoreConfig {
    /// Redis connection config
    pub redis: RedisConfig,
    /// Prefix prepended to every counter key
    pub key_prefix: String,
}

/// Redis-backed counter store.
///
/// `hit_window` sends INCR, EXPIRE and GET as one MULTI/EXEC pipeline, so a
/// request costs a single round trip and concurrent increments are never lost.
pub struct RedisCounterStore {
    conn: ConnectionManager,
    config: RedisCounterStoreConfig,
}

impl RedisCounterStore {
    pub async fn new(config: RedisCounterStoreConfig) -> Result<Self, CounterStoreError> {
        let client = Client::open(config.redis.url.as_str())
            .map_err(|e| CounterStoreError::Connection(e.to_string()))?;

        // Use timeout to prevent hanging if Redis is unreachable
        let conn_manager_fut = ConnectionManager::new(client);
        let conn = tokio::time::timeout(config.redis.connect_timeout, conn_manager_fut)
            .await
            .map_err(|_| CounterStoreError::Connection("Connection timed out".to_string()))?
            .map_err(|e| CounterStoreError::Connection(e.to_string()))?;

        tracing::info!(url = %config.redis.url, prefix = %config.key_prefix, "Connected to Redis counter store");

        Ok(Self { conn, config })
    }

    fn make_key(&self, key: &str) -> String {
        if self.config.key_prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}:{}", self.config.key_prefix, key)
        }
    }
}

fn op_error(e: redis::RedisError) -> CounterStoreError {
    // Socket-level timeouts carry no configured bound; the evaluator reports its own.
    if e.is_timeout()
        || e.is_connection_dropped()
        || e.is_connection_refusal()
        || e.is_io_error()
    {
        CounterStoreError::Connection(e.to_string())
    } else {
        CounterStoreError::Operation(e.to_string())
    }
}

fn ttl_secs(ttl: Duration) -> i64 {
    ttl.as_secs().max(1) as i64
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn increment(&self, key: &str) -> Result<u64, CounterStoreError> {
        let mut conn = self.conn.clone();
        conn.incr::<_, _, u64>(self.make_key(key), 1)
            .await
            .map_err(op_error)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), CounterStoreError> {
        let mut conn = self.conn.clone();
        conn.expire::<_, ()>(self.make_key(key), ttl_secs(ttl))
            .await
            .map_err(op_error)
    }

    async fn get(&self, key: &str) -> Result<Option<u64>, CounterStoreError> {
        let mut conn = self.conn.clone();
        conn.get::<_, Option<u64>>(self.make_key(key))
            .await
            .map_err(op_error)
    }

    async fn hit_window(
        &self,
        current: &str,
        ttl: Duration,
        previous: Option<&str>,
    ) -> Result<WindowCounts, CounterStoreError> {
        let current_key = self.make_key(current);
        let mut conn = self.conn.clone();

        let mut pipe = redis::pipe();
        pipe.atomic()
            .incr(&current_key, 1)
            .expire(&current_key, ttl_secs(ttl))
            .ignore();

        let counts = match previous {
            Some(previous) => {
                pipe.get(self.make_key(previous));
                let (current, previous): (u64, Option<u64>) =
                    pipe.query_async(&mut conn).await.map_err(op_error)?;
                WindowCounts {
                    current,
                    previous: previous.unwrap_or(0),
                }
            }
            None => {
                let (current,): (u64,) = pipe.query_async(&mut conn).await.map_err(op_error)?;
                WindowCounts {
                    current,
                    previous: 0,
                }
            }
        };

        Ok(counts)
    }
}
