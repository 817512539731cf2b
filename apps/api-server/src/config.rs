//! Application configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use hirewire_core::admission::DEFAULT_STORE_TIMEOUT;

#[cfg(feature = "redis")]
use hirewire_infra::RedisConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub rate_limit: RateLimitSettings,
}

/// Admission control settings.
#[derive(Debug, Clone)]
pub struct RateLimitSettings {
    /// When false the guard is not installed at all.
    pub enabled: bool,
    /// Upper bound on one counter store exchange before failing open.
    pub store_timeout: Duration,
    /// Prefix for counter keys in the shared store.
    pub key_prefix: String,
    /// Shared store; `None` keeps counters in process memory.
    #[cfg(feature = "redis")]
    pub redis: Option<RedisConfig>,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            store_timeout: DEFAULT_STORE_TIMEOUT,
            key_prefix: "ratelimit".to_string(),
            #[cfg(feature = "redis")]
            redis: None,
        }
    }
}

impl RateLimitSettings {
    pub fn from_env() -> Self {
        Self {
            enabled: env::var("RATE_LIMIT_ENABLED")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
            store_timeout: env::var("RATE_LIMIT_STORE_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_STORE_TIMEOUT),
            key_prefix: env::var("RATE_LIMIT_KEY_PREFIX")
                .unwrap_or_else(|_| "ratelimit".to_string()),
            #[cfg(feature = "redis")]
            redis: env::var("REDIS_URL").ok().map(|_| RedisConfig::from_env()),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            rate_limit: RateLimitSettings::from_env(),
        }
    }
}
