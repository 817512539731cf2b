//! Counter key construction per scope.

use super::rate_limit::{RateLimitProfile, RateLimitScope};

/// Caller identifiers available to scope resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identifiers {
    pub ip: String,
    pub user_id: Option<String>,
    pub tenant_id: Option<String>,
}

impl Identifiers {
    pub fn new(ip: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            user_id: None,
            tenant_id: None,
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    fn user(&self) -> Option<&str> {
        self.user_id.as_deref().filter(|id| !id.is_empty())
    }

    fn tenant(&self) -> Option<&str> {
        self.tenant_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Build the counter key for one rule.
///
/// Returns `None` when the scope needs an identifier the request does not
/// carry; the rule then does not apply to this request.
pub fn build_key(
    profile: RateLimitProfile,
    scope: RateLimitScope,
    ids: &Identifiers,
) -> Option<String> {
    let profile = profile.key_segment();
    let segment = scope.key_segment();

    match scope {
        RateLimitScope::Ip => Some(format!("{profile}:{segment}:{}", ids.ip)),
        RateLimitScope::User => ids.user().map(|user| format!("{profile}:{segment}:{user}")),
        RateLimitScope::Tenant => ids
            .tenant()
            .map(|tenant| format!("{profile}:{segment}:{tenant}")),
        RateLimitScope::UserAndTenant => match (ids.tenant(), ids.user()) {
            (Some(tenant), Some(user)) => Some(format!("{profile}:{segment}:{tenant}:{user}")),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ip_scope_always_resolves() {
        let ids = Identifiers::new("1.2.3.4");
        assert_eq!(
            build_key(RateLimitProfile::Auth, RateLimitScope::Ip, &ids).as_deref(),
            Some("auth:ip:1.2.3.4")
        );
    }

    #[test]
    fn test_user_and_tenant_scopes() {
        let ids = Identifiers::new("10.0.0.1").with_user("u-1").with_tenant("t-9");

        assert_eq!(
            build_key(RateLimitProfile::Read, RateLimitScope::User, &ids).as_deref(),
            Some("read:user:u-1")
        );
        assert_eq!(
            build_key(RateLimitProfile::Read, RateLimitScope::Tenant, &ids).as_deref(),
            Some("read:tenant:t-9")
        );
        assert_eq!(
            build_key(RateLimitProfile::AuthSensitive, RateLimitScope::UserAndTenant, &ids)
                .as_deref(),
            Some("auth_sensitive:user_tenant:t-9:u-1")
        );
    }

    #[test]
    fn test_missing_identifiers_skip() {
        let anonymous = Identifiers::new("10.0.0.1");
        assert_eq!(build_key(RateLimitProfile::Write, RateLimitScope::User, &anonymous), None);
        assert_eq!(build_key(RateLimitProfile::Write, RateLimitScope::Tenant, &anonymous), None);

        let user_only = Identifiers::new("10.0.0.1").with_user("u-1");
        assert_eq!(
            build_key(RateLimitProfile::Write, RateLimitScope::UserAndTenant, &user_only),
            None
        );

        let blank_tenant = Identifiers::new("10.0.0.1").with_user("u-1").with_tenant("");
        assert_eq!(
            build_key(RateLimitProfile::Write, RateLimitScope::Tenant, &blank_tenant),
            None
        );
    }

    #[test]
    fn test_key_resolution_is_deterministic() {
        let ids = Identifiers::new("1.2.3.4").with_user("u").with_tenant("t");
        for scope in [
            RateLimitScope::Ip,
            RateLimitScope::User,
            RateLimitScope::Tenant,
            RateLimitScope::UserAndTenant,
        ] {
            let first = build_key(RateLimitProfile::Calendar, scope, &ids);
            let second = build_key(RateLimitProfile::Calendar, scope, &ids.clone());
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_profiles_do_not_share_keys() {
        let ids = Identifiers::new("1.2.3.4");
        assert_ne!(
            build_key(RateLimitProfile::Auth, RateLimitScope::Ip, &ids),
            build_key(RateLimitProfile::AuthSensitive, RateLimitScope::Ip, &ids)
        );
    }
}
