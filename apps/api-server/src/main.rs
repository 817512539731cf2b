//! # Hirewire API Server
//!
//! Actix-web host for the admission-control layer. Every request passes
//! through the rate limit guard before it reaches a handler.

use actix_web::middleware::Condition;
use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

mod config;
mod handlers;
mod middleware;
mod routes;
mod state;
mod telemetry;

use config::AppConfig;
use middleware::{GatewayIdentity, RateLimitMiddleware};
use state::AppState;
use telemetry::TelemetryConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    telemetry::init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        host = %config.host,
        port = config.port,
        rate_limit_enabled = config.rate_limit.enabled,
        "Starting Hirewire API Server"
    );

    let state = AppState::new(&config).await.map_err(std::io::Error::other)?;
    let enabled = config.rate_limit.enabled;

    // Middleware registered last runs first: tracing, identity, then the guard.
    HttpServer::new(move || {
        App::new()
            .wrap(Condition::new(
                enabled,
                RateLimitMiddleware::new(state.guard.clone()),
            ))
            .wrap(GatewayIdentity)
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
