//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

mod config;

use crate::config::ServerConfig;
use axum::{
    Json, Router, http,
    http::{Method, header},
    middleware,
    routing::get,
};
use limiter::{PgCounterStore, RateLimitState, rate_limit_router, with_rate_limit};
use platform::client::attach_trusted_caller;
use platform::clock::SystemClock;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api=info,limiter=info,platform=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    tracing::info!(
        window_secs = config.rate_limit.window_size_secs(),
        standard_limit = config.rate_limit.standard_limit,
        admin_limit = config.rate_limit.admin_limit,
        on_store_error = %config.rate_limit.on_store_error,
        table = %config.table,
        "Rate limit configuration loaded"
    );

    // Database connection
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(config.rate_limit.store_timeout)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Connected to database");

    let store = PgCounterStore::new(pool, &config.table)?;
    store.ensure_schema().await?;

    // Startup cleanup: remove expired windows
    // Errors here should not prevent server startup
    if let Err(e) = store.purge_expired().await {
        tracing::warn!(
            error = %e,
            "Rate limit window cleanup failed, continuing anyway"
        );
    }
    spawn_purge_task(store.clone(), config.purge_interval);

    let state = RateLimitState::new(store, config.rate_limit.clone(), Arc::new(SystemClock));

    let cors = cors_layer(&config.frontend_origins);

    let protected = Router::new().route("/api/hello", get(hello));

    // Build router
    let app = with_rate_limit(protected, state.clone())
        .nest("/api/rate-limit", rate_limit_router(state))
        .layer(middleware::from_fn(attach_trusted_caller))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    tracing::info!("Listening on {}", config.bind_addr);

    let listener = TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Browser CORS policy. Gateway identity headers are never allowed.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed_origins: Vec<http::HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([Method::GET, Method::OPTIONS]))
        .allow_headers(AllowHeaders::list([header::CONTENT_TYPE, header::ACCEPT]))
        .expose_headers([
            platform::rate_limit::RATE_LIMIT_LIMIT,
            platform::rate_limit::RATE_LIMIT_REMAINING,
            platform::rate_limit::RATE_LIMIT_RESET,
            header::RETRY_AFTER,
        ])
}

/// GET /api/hello
async fn hello() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "hello" }))
}

/// Periodically delete windows past their grace period.
fn spawn_purge_task(store: PgCounterStore, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // First tick fires immediately; startup already purged.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(e) = store.purge_expired().await {
                tracing::warn!(error = %e, "Periodic rate limit cleanup failed");
            }
        }
    });
}
