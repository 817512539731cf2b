//! Middleware modules.

pub mod error;
pub mod identity;
pub mod rate_limit;

pub use identity::{GatewayIdentity, Identity};
pub use rate_limit::RateLimitMiddleware;
