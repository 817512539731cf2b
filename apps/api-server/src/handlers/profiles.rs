//! Rate limit profile introspection.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use hirewire_core::domain::{RateLimitProfile, RateLimitProfileConfig};

use crate::middleware::error::AppResult;
use crate::state::AppState;

#[derive(Serialize)]
pub struct ProfileListResponse<'a> {
    pub profiles: Vec<&'a RateLimitProfileConfig>,
}

/// GET /api/rate-limits/profiles
pub async fn list_profiles(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ProfileListResponse {
        profiles: state.profiles.configs(),
    })
}

/// GET /api/rate-limits/profiles/{name}
///
/// Accepts any case and `-` for `_` (`auth-sensitive`).
pub async fn get_profile(
    state: web::Data<AppState>,
    name: web::Path<String>,
) -> AppResult<HttpResponse> {
    let profile: RateLimitProfile = name.parse()?;
    Ok(HttpResponse::Ok().json(state.profiles.get_config(profile)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RateLimitSettings;
    use crate::handlers::configure_routes;
    use crate::middleware::{GatewayIdentity, RateLimitMiddleware};
    use actix_web::{App, http::StatusCode, test};
    use hirewire_core::domain::ProfileRegistry;
    use hirewire_infra::InMemoryCounterStore;
    use std::sync::Arc;

    fn state() -> AppState {
        AppState::with_store(
            Arc::new(InMemoryCounterStore::new()),
            "memory",
            Arc::new(ProfileRegistry::standard()),
            &RateLimitSettings::default(),
        )
    }

    #[actix_web::test]
    async fn test_list_profiles_in_declaration_order() {
        let state = state();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/rate-limits/profiles").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        let names: Vec<&str> = body["profiles"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["profile"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            [
                "AUTH",
                "AUTH_SENSITIVE",
                "READ",
                "WRITE",
                "CALENDAR",
                "BULK",
                "REPORT",
                "WEBHOOK",
                "NONE"
            ]
        );
        assert_eq!(body["profiles"][0]["rules"][0]["max"], 5);
        assert_eq!(body["profiles"][0]["rules"][0]["scope"], "IP");
    }

    #[actix_web::test]
    async fn test_get_profile_by_name() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/rate-limits/profiles/auth-sensitive")
            .to_request();
        let body: RateLimitProfileConfig = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.profile, RateLimitProfile::AuthSensitive);
        assert_eq!(body.rules[0].max, 3);

        let req = test::TestRequest::get()
            .uri("/api/rate-limits/profiles/turbo")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_full_stack_health_is_never_limited() {
        let state = state();
        let guard = state.guard.clone();
        let app = test::init_service(
            App::new()
                .wrap(RateLimitMiddleware::new(guard))
                .wrap(GatewayIdentity)
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        for _ in 0..20 {
            let req = test::TestRequest::get().uri("/api/health").to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
            assert!(resp.headers().get("x-ratelimit-limit").is_none());
        }

        let req = test::TestRequest::get()
            .uri("/api/rate-limits/profiles")
            .insert_header(("X-User-ID", "u-1"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("x-ratelimit-limit").unwrap().to_str().unwrap(),
            "300"
        );
    }
}
