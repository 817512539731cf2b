//! Ports - trait definitions for external dependencies.
//! Infrastructure crates provide the implementations.

mod counter_store;

pub use counter_store::{CounterStore, CounterStoreError, WindowCounts};
