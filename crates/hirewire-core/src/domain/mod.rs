//! Domain types - rate limit model, profile table, scope keys and routing.

mod rate_limit;
mod registry;
mod request;
mod routing;
mod scope_key;

pub use rate_limit::{
    RateLimitCheckResult, RateLimitProfile, RateLimitProfileConfig, RateLimitRule, RateLimitScope,
};
pub use registry::ProfileRegistry;
pub use request::{RequestContext, UNKNOWN_CLIENT};
pub use routing::{ResolvedRoute, RouteMetadata, RouteTable};
pub use scope_key::{Identifiers, build_key};
