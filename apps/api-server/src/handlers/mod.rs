//! HTTP handlers and route configuration.
//!
//! Resource names double as rate limit operation ids, see `routes.rs`.

mod health;
mod profiles;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .service(
                web::resource("/health")
                    .name("health.check")
                    .route(web::get().to(health::health_check)),
            )
            // Rate limit introspection
            .service(
                web::scope("/rate-limits")
                    .service(
                        web::resource("/profiles")
                            .name("rate_limits.list")
                            .route(web::get().to(profiles::list_profiles)),
                    )
                    .service(
                        web::resource("/profiles/{name}")
                            .name("rate_limits.get")
                            .route(web::get().to(profiles::get_profile)),
                    ),
            ),
    );
}
