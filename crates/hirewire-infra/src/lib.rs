//! # Hirewire Infrastructure
//!
//! Concrete implementations of the ports defined in `hirewire-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `redis` - Redis-backed counter store shared across server instances

pub mod counter_store;

// Re-exports - In-Memory
pub use counter_store::InMemoryCounterStore;

// Re-exports - Redis
#[cfg(feature = "redis")]
pub use counter_store::{RedisConfig, RedisCounterStore, RedisCounterStoreConfig};
