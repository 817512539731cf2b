//! Operation → rate limit profile table for the recruitment API.
//!
//! Operation ids are actix resource names (`group.operation`). Anything not
//! listed here is limited as READ.

use hirewire_core::domain::{RateLimitProfile, RouteMetadata, RouteTable};

pub fn route_table() -> RouteTable {
    use RateLimitProfile::{Auth, AuthSensitive, Bulk, Calendar, Read, Report, Webhook, Write};

    RouteTable::new()
        // Probes and load balancers
        .group("health", RouteMetadata::skip())
        // Authentication
        .group("auth", RouteMetadata::profile(Auth))
        .operation("auth.password_reset", RouteMetadata::profile(AuthSensitive))
        .operation("auth.password_change", RouteMetadata::profile(AuthSensitive))
        .operation("auth.mfa_verify", RouteMetadata::profile(AuthSensitive))
        .operation("auth.logout", RouteMetadata::profile(Write))
        // Candidates and jobs
        .group("candidates", RouteMetadata::profile(Read))
        .operation("candidates.create", RouteMetadata::profile(Write))
        .operation("candidates.update", RouteMetadata::profile(Write))
        .operation("candidates.delete", RouteMetadata::profile(Write))
        .operation("candidates.bulk_update", RouteMetadata::profile(Bulk))
        .group("jobs", RouteMetadata::profile(Read))
        .operation("jobs.create", RouteMetadata::profile(Write))
        .operation("jobs.update", RouteMetadata::profile(Write))
        // Interviews
        .group("interviews", RouteMetadata::profile(Read))
        .operation("interviews.schedule", RouteMetadata::profile(Write))
        .operation("interviews.reschedule", RouteMetadata::profile(Write))
        .operation("interviews.availability", RouteMetadata::profile(Calendar))
        // Calendar integrations
        .group("calendar", RouteMetadata::profile(Calendar))
        // Bulk imports
        .group("imports", RouteMetadata::profile(Bulk))
        .operation("imports.status", RouteMetadata::profile(Read))
        // Reports
        .group("reports", RouteMetadata::profile(Report))
        .operation("reports.list", RouteMetadata::profile(Read))
        // Inbound integration webhooks
        .group("webhooks", RouteMetadata::profile(Webhook))
        // Service-to-service traffic behind the gateway
        .group("internal", RouteMetadata::profile(RateLimitProfile::None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hirewire_core::domain::ResolvedRoute;

    #[test]
    fn test_recruitment_routes_resolve() {
        let table = route_table();

        assert!(table.resolve(Some("health.check")).skip);
        assert_eq!(
            table.resolve(Some("auth.login")).profile,
            RateLimitProfile::Auth
        );
        assert_eq!(
            table.resolve(Some("auth.password_reset")).profile,
            RateLimitProfile::AuthSensitive
        );
        assert_eq!(
            table.resolve(Some("candidates.bulk_update")).profile,
            RateLimitProfile::Bulk
        );
        assert_eq!(
            table.resolve(Some("imports.status")).profile,
            RateLimitProfile::Read
        );
        assert_eq!(
            table.resolve(Some("webhooks.greenhouse")).profile,
            RateLimitProfile::Webhook
        );
        assert_eq!(
            table.resolve(Some("internal.sync")).profile,
            RateLimitProfile::None
        );
    }

    #[test]
    fn test_unlisted_operations_are_read() {
        let table = route_table();
        assert_eq!(table.resolve(Some("rate_limits.list")), ResolvedRoute::default());
        assert_eq!(table.resolve(None), ResolvedRoute::default());
    }
}
