//! Gateway identity propagation.
//!
//! Authentication happens upstream. The gateway forwards the caller's user
//! and tenant ids as headers; this middleware lifts them into a request
//! extension so later middleware and handlers can read them.

use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use std::future::{Ready, ready};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const TENANT_ID_HEADER: &str = "x-tenant-id";

/// Caller identity as asserted by the gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Option<String>,
    pub tenant_id: Option<String>,
}

impl Identity {
    fn from_request(req: &ServiceRequest) -> Option<Self> {
        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        let identity = Self {
            user_id: header(USER_ID_HEADER),
            tenant_id: header(TENANT_ID_HEADER),
        };

        (identity.user_id.is_some() || identity.tenant_id.is_some()).then_some(identity)
    }
}

/// Middleware factory inserting [`Identity`] into request extensions.
pub struct GatewayIdentity;

impl<S, B> Transform<S, ServiceRequest> for GatewayIdentity
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = GatewayIdentityService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(GatewayIdentityService { service }))
    }
}

pub struct GatewayIdentityService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for GatewayIdentityService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = S::Future;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if let Some(identity) = Identity::from_request(&req) {
            tracing::trace!(
                user_id = identity.user_id.as_deref().unwrap_or("-"),
                tenant_id = identity.tenant_id.as_deref().unwrap_or("-"),
                "Gateway identity attached"
            );
            req.extensions_mut().insert(identity);
        }

        self.service.call(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpRequest, HttpResponse, test, web};

    async fn echo(req: HttpRequest) -> HttpResponse {
        match req.extensions().get::<Identity>() {
            Some(identity) => HttpResponse::Ok().body(format!(
                "{}|{}",
                identity.user_id.as_deref().unwrap_or(""),
                identity.tenant_id.as_deref().unwrap_or("")
            )),
            None => HttpResponse::NoContent().finish(),
        }
    }

    #[actix_web::test]
    async fn test_headers_become_identity() {
        let app = test::init_service(
            App::new()
                .wrap(GatewayIdentity)
                .route("/", web::get().to(echo)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header(("X-User-ID", "u-1"))
            .insert_header(("X-Tenant-ID", "t-1"))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "u-1|t-1");

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header(("X-Tenant-ID", "t-1"))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "|t-1");
    }

    #[actix_web::test]
    async fn test_missing_or_blank_headers_leave_no_identity() {
        let app = test::init_service(
            App::new()
                .wrap(GatewayIdentity)
                .route("/", web::get().to(echo)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header(("X-User-ID", "  "))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::NO_CONTENT);
    }
}
