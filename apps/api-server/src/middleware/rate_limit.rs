//! Rate limiting middleware.
//!
//! Thin adapter between actix and the core guard: builds a `RequestContext`,
//! awaits the decision, then either forwards the request with rate limit
//! headers or answers 429.

use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header::{HeaderMap, HeaderName, HeaderValue},
};
use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::rc::Rc;

use hirewire_core::admission::HEADER_RETRY_AFTER;
use hirewire_core::domain::RequestContext;
use hirewire_core::{AdmissionDecision, RateLimitHeaders, RequestEvaluator};

use super::identity::Identity;

/// Rate limiting middleware factory.
pub struct RateLimitMiddleware {
    guard: RequestEvaluator,
}

impl RateLimitMiddleware {
    pub fn new(guard: RequestEvaluator) -> Self {
        Self { guard }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service: Rc::new(service),
            guard: self.guard.clone(),
        }))
    }
}

pub struct RateLimitMiddlewareService<S> {
    service: Rc<S>,
    guard: RequestEvaluator,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let guard = self.guard.clone();

        Box::pin(async move {
            let ctx = request_context(&req);

            match guard.evaluate(&ctx).await {
                AdmissionDecision::Admit { headers } => {
                    let mut res = service.call(req).await?;
                    if let Some(headers) = headers {
                        apply_headers(res.headers_mut(), &headers);
                    }
                    Ok(res.map_into_left_body())
                }
                AdmissionDecision::Deny {
                    headers,
                    retry_after,
                    body,
                } => {
                    let mut response = HttpResponse::TooManyRequests();
                    for pair in headers.to_pairs() {
                        response.insert_header(pair);
                    }
                    response.insert_header((HEADER_RETRY_AFTER, retry_after.to_string()));

                    let (http_req, _payload) = req.into_parts();
                    let srv_response = ServiceResponse::new(http_req, response.json(body));
                    Ok(srv_response.map_into_right_body())
                }
            }
        })
    }
}

/// Everything the guard needs, lifted out of the actix request.
fn request_context(req: &ServiceRequest) -> RequestContext {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };

    let identity = req.extensions().get::<Identity>().cloned().unwrap_or_default();

    RequestContext {
        // Resolved against the app's resource map, so it is known before routing.
        operation: req.request().match_name().map(str::to_string),
        forwarded_for: header("x-forwarded-for"),
        real_ip: header("x-real-ip"),
        peer_addr: req.peer_addr().map(|addr| addr.ip().to_string()),
        user_id: identity.user_id,
        tenant_id: identity.tenant_id,
    }
}

fn apply_headers(target: &mut HeaderMap, headers: &RateLimitHeaders) {
    for (name, value) in headers.to_pairs() {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            target.insert(name, value);
        }
    }
}
