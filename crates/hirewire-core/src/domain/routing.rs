//! Static operation → profile routing.
//!
//! Each operation is identified as `group.operation`. Metadata can be attached
//! to a whole group or to a single operation; operation-level values win.

use std::collections::HashMap;

use super::rate_limit::RateLimitProfile;

/// Rate limit metadata declared for a group or an operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteMetadata {
    pub profile: Option<RateLimitProfile>,
    pub skip: Option<bool>,
}

impl RouteMetadata {
    pub fn profile(profile: RateLimitProfile) -> Self {
        Self {
            profile: Some(profile),
            skip: None,
        }
    }

    pub fn skip() -> Self {
        Self {
            profile: None,
            skip: Some(true),
        }
    }

    /// Re-enable limiting on an operation inside a skipped group.
    pub fn enforce() -> Self {
        Self {
            profile: None,
            skip: Some(false),
        }
    }
}

/// Effective settings for one operation after applying precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRoute {
    pub profile: RateLimitProfile,
    pub skip: bool,
}

impl Default for ResolvedRoute {
    fn default() -> Self {
        Self {
            profile: RateLimitProfile::Read,
            skip: false,
        }
    }
}

/// Two-level lookup table built at startup.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    groups: HashMap<String, RouteMetadata>,
    operations: HashMap<String, RouteMetadata>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group(mut self, name: impl Into<String>, metadata: RouteMetadata) -> Self {
        self.groups.insert(name.into(), metadata);
        self
    }

    pub fn operation(mut self, id: impl Into<String>, metadata: RouteMetadata) -> Self {
        self.operations.insert(id.into(), metadata);
        self
    }

    /// Resolve the effective profile and skip flag for an operation id.
    pub fn resolve(&self, operation: Option<&str>) -> ResolvedRoute {
        let Some(operation) = operation else {
            return ResolvedRoute::default();
        };

        let group_name = operation.split_once('.').map_or(operation, |(group, _)| group);
        let op = self.operations.get(operation);
        let group = self.groups.get(group_name);

        let profile = op
            .and_then(|m| m.profile)
            .or_else(|| group.and_then(|m| m.profile))
            .unwrap_or(RateLimitProfile::Read);
        let skip = op
            .and_then(|m| m.skip)
            .or_else(|| group.and_then(|m| m.skip))
            .unwrap_or(false);

        ResolvedRoute { profile, skip }
    }
}
