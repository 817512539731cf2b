//! Request evaluator - the admission decision for one inbound request.

use std::sync::Arc;

use hirewire_shared::RateLimitExceededBody;

use super::sliding_window::SlidingWindowEvaluator;
use crate::domain::{
    ProfileRegistry, RateLimitCheckResult, RateLimitProfile, RateLimitScope, RequestContext,
    ResolvedRoute, RouteTable, build_key,
};

pub const HEADER_LIMIT: &str = "X-RateLimit-Limit";
pub const HEADER_REMAINING: &str = "X-RateLimit-Remaining";
pub const HEADER_RESET: &str = "X-RateLimit-Reset";
pub const HEADER_RETRY_AFTER: &str = "Retry-After";

/// Rate limit headers attached to every counted response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitHeaders {
    pub limit: u64,
    pub remaining: u64,
    /// Absolute unix timestamp (seconds) at which the window resets.
    pub reset: u64,
}

impl RateLimitHeaders {
    fn from_result(result: &RateLimitCheckResult) -> Self {
        Self {
            limit: result.limit,
            remaining: result.remaining,
            reset: result.evaluated_at / 1000 + result.reset_in_seconds,
        }
    }

    pub fn to_pairs(&self) -> [(&'static str, String); 3] {
        [
            (HEADER_LIMIT, self.limit.to_string()),
            (HEADER_REMAINING, self.remaining.to_string()),
            (HEADER_RESET, self.reset.to_string()),
        ]
    }
}

/// What the framework adapter should do with the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionDecision {
    /// Pass the request on; set `headers` on the response when present.
    Admit { headers: Option<RateLimitHeaders> },
    /// Answer 429 immediately.
    Deny {
        headers: RateLimitHeaders,
        retry_after: u64,
        body: RateLimitExceededBody,
    },
}

impl AdmissionDecision {
    pub fn is_admitted(&self) -> bool {
        matches!(self, AdmissionDecision::Admit { .. })
    }

    pub fn headers(&self) -> Option<&RateLimitHeaders> {
        match self {
            AdmissionDecision::Admit { headers } => headers.as_ref(),
            AdmissionDecision::Deny { headers, .. } => Some(headers),
        }
    }
}

/// The guard every request passes through before business logic.
#[derive(Clone)]
pub struct RequestEvaluator {
    profiles: Arc<ProfileRegistry>,
    routes: Arc<RouteTable>,
    window: SlidingWindowEvaluator,
}

impl RequestEvaluator {
    pub fn new(
        profiles: Arc<ProfileRegistry>,
        routes: Arc<RouteTable>,
        window: SlidingWindowEvaluator,
    ) -> Self {
        Self {
            profiles,
            routes,
            window,
        }
    }

    pub fn profiles(&self) -> &ProfileRegistry {
        &self.profiles
    }

    /// Resolve the request's operation in the route table and evaluate it.
    pub async fn evaluate(&self, ctx: &RequestContext) -> AdmissionDecision {
        let route = self.routes.resolve(ctx.operation.as_deref());
        self.evaluate_route(&route, ctx).await
    }

    /// Evaluate against already-resolved route metadata.
    pub async fn evaluate_route(
        &self,
        route: &ResolvedRoute,
        ctx: &RequestContext,
    ) -> AdmissionDecision {
        if route.skip {
            return AdmissionDecision::Admit { headers: None };
        }

        let config = self.profiles.get_config(route.profile);
        if config.is_unlimited() {
            return AdmissionDecision::Admit { headers: None };
        }

        let ids = ctx.identifiers();
        let mut most_restrictive: Option<RateLimitCheckResult> = None;

        for rule in &config.rules {
            let Some(key) = build_key(config.profile, rule.scope, &ids) else {
                tracing::trace!(
                    profile = %config.profile,
                    scope = %rule.scope,
                    "Identifier missing, rule skipped"
                );
                continue;
            };

            let result = self.window.check(&key, rule).await;

            if !result.allowed {
                let scope = result.triggered_scope.unwrap_or(rule.scope);

                tracing::warn!(
                    key = %key,
                    profile = %config.profile,
                    scope = %scope,
                    current = result.current,
                    limit = result.limit,
                    "Rate limit exceeded"
                );

                return AdmissionDecision::Deny {
                    headers: RateLimitHeaders::from_result(&result),
                    retry_after: result.reset_in_seconds,
                    body: RateLimitExceededBody::new(
                        denial_message(config.profile, scope),
                        result.reset_in_seconds,
                    ),
                };
            }

            if most_restrictive
                .as_ref()
                .is_none_or(|seen| result.remaining < seen.remaining)
            {
                most_restrictive = Some(result);
            }
        }

        let headers = most_restrictive
            .as_ref()
            .map(RateLimitHeaders::from_result);

        tracing::debug!(
            profile = %config.profile,
            operation = ctx.operation.as_deref().unwrap_or("-"),
            remaining = ?headers.map(|h| h.remaining),
            "Request admitted"
        );

        AdmissionDecision::Admit { headers }
    }
}

/// Client-facing text for a denial.
pub fn denial_message(profile: RateLimitProfile, scope: RateLimitScope) -> &'static str {
    match (profile, scope) {
        (RateLimitProfile::Auth | RateLimitProfile::AuthSensitive, _) => {
            "Too many authentication attempts. Please wait before trying again."
        }
        (RateLimitProfile::Bulk, _) => {
            "Bulk operation limit reached for your organization. Please wait before starting another bulk operation."
        }
        (RateLimitProfile::Calendar, _) => {
            "Too many calendar requests. Please slow down calendar sync and availability lookups."
        }
        (RateLimitProfile::Report, _) => {
            "Report generation limit reached. Please wait before requesting more reports."
        }
        (_, RateLimitScope::Tenant) => {
            "Your organization has exceeded its API request limit. Please try again shortly."
        }
        _ => "Too many requests. Please try again later.",
    }
}
