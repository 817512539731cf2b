//! # Hirewire Shared
//!
//! Wire types returned to API clients. Kept free of server dependencies so
//! SDKs and the dashboard can deserialize the same shapes.

pub mod response;

pub use response::{ErrorResponse, RateLimitExceededBody};
