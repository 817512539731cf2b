//! Framework-neutral view of an inbound request.

use super::scope_key::Identifiers;

/// Client address used when no header or peer address is available.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Everything the guard needs to know about a request.
///
/// Framework adapters fill this in; the core never sees framework types.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Operation identifier, `group.operation` (e.g. `candidates.list`).
    pub operation: Option<String>,
    /// Raw `X-Forwarded-For` header.
    pub forwarded_for: Option<String>,
    /// Raw `X-Real-IP` header.
    pub real_ip: Option<String>,
    /// Transport-level peer address.
    pub peer_addr: Option<String>,
    pub user_id: Option<String>,
    pub tenant_id: Option<String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    pub fn with_peer(mut self, peer: impl Into<String>) -> Self {
        self.peer_addr = Some(peer.into());
        self
    }

    pub fn with_forwarded_for(mut self, header: impl Into<String>) -> Self {
        self.forwarded_for = Some(header.into());
        self
    }

    pub fn with_real_ip(mut self, header: impl Into<String>) -> Self {
        self.real_ip = Some(header.into());
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    /// Client IP: first `X-Forwarded-For` entry, then `X-Real-IP`, then the peer.
    pub fn client_ip(&self) -> String {
        let forwarded = self
            .forwarded_for
            .as_deref()
            .and_then(|header| header.split(',').next())
            .map(str::trim);

        [forwarded, self.real_ip.as_deref().map(str::trim), self.peer_addr.as_deref()]
            .into_iter()
            .flatten()
            .find(|candidate| !candidate.is_empty())
            .unwrap_or(UNKNOWN_CLIENT)
            .to_string()
    }

    pub fn identifiers(&self) -> Identifiers {
        Identifiers {
            ip: self.client_ip(),
            user_id: self.user_id.clone(),
            tenant_id: self.tenant_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forwarded_for_first_entry_wins() {
        let ctx = RequestContext::new()
            .with_forwarded_for(" 203.0.113.7 , 10.0.0.2, 10.0.0.3")
            .with_real_ip("198.51.100.1")
            .with_peer("10.0.0.3");

        assert_eq!(ctx.client_ip(), "203.0.113.7");
    }

    #[test]
    fn test_real_ip_then_peer() {
        let ctx = RequestContext::new()
            .with_real_ip("198.51.100.1")
            .with_peer("10.0.0.3");
        assert_eq!(ctx.client_ip(), "198.51.100.1");

        let ctx = RequestContext::new().with_forwarded_for("").with_peer("10.0.0.3");
        assert_eq!(ctx.client_ip(), "10.0.0.3");
    }

    #[test]
    fn test_no_address_at_all() {
        assert_eq!(RequestContext::new().client_ip(), UNKNOWN_CLIENT);
    }

    #[test]
    fn test_identifiers_carry_user_and_tenant() {
        let ids = RequestContext::new()
            .with_peer("10.0.0.3")
            .with_user("u-1")
            .with_tenant("t-1")
            .identifiers();

        assert_eq!(ids, Identifiers::new("10.0.0.3").with_user("u-1").with_tenant("t-1"));
    }
}
