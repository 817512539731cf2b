//! Rate limit profiles, scopes, rules and per-rule check results.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A class of endpoint sharing one set of rate limit rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RateLimitProfile {
    /// Login, registration and token refresh.
    Auth,
    /// Password reset, MFA and other credential-changing flows.
    AuthSensitive,
    Read,
    Write,
    /// Calendar sync and availability lookups.
    Calendar,
    /// Imports and mass updates.
    Bulk,
    Report,
    /// Inbound webhooks from integrations.
    Webhook,
    /// Never limited.
    None,
}

impl RateLimitProfile {
    pub const ALL: [RateLimitProfile; 9] = [
        RateLimitProfile::Auth,
        RateLimitProfile::AuthSensitive,
        RateLimitProfile::Read,
        RateLimitProfile::Write,
        RateLimitProfile::Calendar,
        RateLimitProfile::Bulk,
        RateLimitProfile::Report,
        RateLimitProfile::Webhook,
        RateLimitProfile::None,
    ];

    /// Segment used as the first component of counter keys.
    pub fn key_segment(&self) -> &'static str {
        match self {
            RateLimitProfile::Auth => "auth",
            RateLimitProfile::AuthSensitive => "auth_sensitive",
            RateLimitProfile::Read => "read",
            RateLimitProfile::Write => "write",
            RateLimitProfile::Calendar => "calendar",
            RateLimitProfile::Bulk => "bulk",
            RateLimitProfile::Report => "report",
            RateLimitProfile::Webhook => "webhook",
            RateLimitProfile::None => "none",
        }
    }

    /// Upper-case name as it appears in configuration and API output.
    pub fn as_str(&self) -> &'static str {
        match self {
            RateLimitProfile::Auth => "AUTH",
            RateLimitProfile::AuthSensitive => "AUTH_SENSITIVE",
            RateLimitProfile::Read => "READ",
            RateLimitProfile::Write => "WRITE",
            RateLimitProfile::Calendar => "CALENDAR",
            RateLimitProfile::Bulk => "BULK",
            RateLimitProfile::Report => "REPORT",
            RateLimitProfile::Webhook => "WEBHOOK",
            RateLimitProfile::None => "NONE",
        }
    }
}

impl fmt::Display for RateLimitProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RateLimitProfile {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|profile| profile.as_str() == normalized)
            .ok_or_else(|| DomainError::UnknownProfile(s.to_string()))
    }
}

/// The identifier dimension a rule counts against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RateLimitScope {
    Ip,
    User,
    Tenant,
    /// Both identifiers required, counted as one composite key.
    UserAndTenant,
}

impl RateLimitScope {
    pub fn key_segment(&self) -> &'static str {
        match self {
            RateLimitScope::Ip => "ip",
            RateLimitScope::User => "user",
            RateLimitScope::Tenant => "tenant",
            RateLimitScope::UserAndTenant => "user_tenant",
        }
    }
}

impl fmt::Display for RateLimitScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key_segment())
    }
}

/// A single constraint: at most `max` requests per `window_seconds`, counted per `scope`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RuleFields")]
pub struct RateLimitRule {
    pub max: u64,
    pub window_seconds: u64,
    pub scope: RateLimitScope,
}

impl RateLimitRule {
    /// Build a rule, rejecting an empty window.
    pub fn new(max: u64, window_seconds: u64, scope: RateLimitScope) -> Result<Self, DomainError> {
        if window_seconds == 0 {
            return Err(DomainError::InvalidRule(format!(
                "window must be at least one second (scope {scope})"
            )));
        }
        Ok(Self {
            max,
            window_seconds,
            scope,
        })
    }

    /// Rules for the built-in table, where the window is known to be non-zero.
    pub(crate) const fn fixed(max: u64, window_seconds: u64, scope: RateLimitScope) -> Self {
        Self {
            max,
            window_seconds,
            scope,
        }
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }

    pub fn window_millis(&self) -> u64 {
        self.window_seconds.saturating_mul(1000)
    }

    /// Counter TTL: long enough for a bucket to serve as the previous window.
    pub fn counter_ttl(&self) -> Duration {
        Duration::from_secs(self.window_seconds.saturating_mul(2))
    }
}

/// Unvalidated wire form; deserialization goes through [`RateLimitRule::new`].
#[derive(Deserialize)]
struct RuleFields {
    max: u64,
    window_seconds: u64,
    scope: RateLimitScope,
}

impl TryFrom<RuleFields> for RateLimitRule {
    type Error = DomainError;

    fn try_from(fields: RuleFields) -> Result<Self, Self::Error> {
        Self::new(fields.max, fields.window_seconds, fields.scope)
    }
}

/// All rules owned by one profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitProfileConfig {
    pub profile: RateLimitProfile,
    pub description: String,
    pub rules: Vec<RateLimitRule>,
}

impl RateLimitProfileConfig {
    pub fn new(
        profile: RateLimitProfile,
        description: impl Into<String>,
        rules: Vec<RateLimitRule>,
    ) -> Self {
        Self {
            profile,
            description: description.into(),
            rules,
        }
    }

    /// True when requests under this profile are never counted.
    pub fn is_unlimited(&self) -> bool {
        self.profile == RateLimitProfile::None || self.rules.is_empty()
    }
}

/// Outcome of evaluating one rule for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitCheckResult {
    pub allowed: bool,
    /// Weighted request count across the current and previous window.
    pub current: u64,
    pub limit: u64,
    pub remaining: u64,
    pub reset_in_seconds: u64,
    /// Scope of the rule, present only when the result denies.
    pub triggered_scope: Option<RateLimitScope>,
    /// Clock reading (unix milliseconds) the window was evaluated at.
    pub evaluated_at: u64,
}

impl RateLimitCheckResult {
    /// Admit with the full budget; used when the count cannot be trusted.
    pub fn fail_open(rule: &RateLimitRule, reset_in_seconds: u64, evaluated_at: u64) -> Self {
        Self {
            allowed: true,
            current: 0,
            limit: rule.max,
            remaining: rule.max,
            reset_in_seconds,
            triggered_scope: None,
            evaluated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_parse_accepts_config_spellings() {
        assert_eq!(
            "AUTH_SENSITIVE".parse::<RateLimitProfile>().unwrap(),
            RateLimitProfile::AuthSensitive
        );
        assert_eq!(
            "auth-sensitive".parse::<RateLimitProfile>().unwrap(),
            RateLimitProfile::AuthSensitive
        );
        assert_eq!(" bulk ".parse::<RateLimitProfile>().unwrap(), RateLimitProfile::Bulk);
    }

    #[test]
    fn test_profile_parse_unknown() {
        assert_eq!(
            "ARCHIVE".parse::<RateLimitProfile>(),
            Err(DomainError::UnknownProfile("ARCHIVE".to_string()))
        );
    }

    #[test]
    fn test_profile_serde_matches_display() {
        for profile in RateLimitProfile::ALL {
            let json = serde_json::to_string(&profile).unwrap();
            assert_eq!(json, format!("\"{profile}\""));
        }
    }

    #[test]
    fn test_rule_rejects_zero_window() {
        assert!(RateLimitRule::new(10, 0, RateLimitScope::Ip).is_err());

        let rule = RateLimitRule::new(0, 60, RateLimitScope::User).unwrap();
        assert_eq!(rule.window_millis(), 60_000);
        assert_eq!(rule.counter_ttl(), Duration::from_secs(120));
    }

    #[test]
    fn test_deserialize_validates_window() {
        let rule: RateLimitRule =
            serde_json::from_str(r#"{"max":5,"window_seconds":60,"scope":"IP"}"#).unwrap();
        assert_eq!(rule, RateLimitRule::new(5, 60, RateLimitScope::Ip).unwrap());

        let zero = serde_json::from_str::<RateLimitRule>(
            r#"{"max":5,"window_seconds":0,"scope":"IP"}"#,
        );
        assert!(zero.is_err());
    }

    #[test]
    fn test_huge_window_saturates() {
        let rule = RateLimitRule {
            max: 1,
            window_seconds: u64::MAX,
            scope: RateLimitScope::Tenant,
        };
        assert_eq!(rule.window_millis(), u64::MAX);
        assert_eq!(rule.counter_ttl(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_none_profile_is_unlimited() {
        let config = RateLimitProfileConfig::new(
            RateLimitProfile::Read,
            "no rules",
            Vec::new(),
        );
        assert!(config.is_unlimited());
    }
}
