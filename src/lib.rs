// Library exports for the biolink backend
// This file exposes modules and functions for library consumers

pub mod app;
pub mod app_config;
pub mod db;
pub mod handlers;
pub mod middleware;
pub mod migrations;
pub mod models;
pub mod schema;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use app::AppState;
pub use app_config::{AppConfig, CONFIG};
pub use db::{DieselDatabaseConfig, DieselPool};
pub use middleware::{AuthenticatedUser, BillingCaller};
pub use services::{
    AnalyticsService, ClickRecorder, LinkCapacity, LinkService, SubscriptionService, UserService,
};
pub use utils::ServiceError;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build application state from the global configuration
pub async fn initialize_app_state() -> Result<AppState, Box<dyn std::error::Error + Send + Sync>> {
    initialize_app_state_with(app_config::config().clone()).await
}

/// Build application state from an explicit configuration: pool, then migrations
pub async fn initialize_app_state_with(
    config: AppConfig,
) -> Result<AppState, Box<dyn std::error::Error + Send + Sync>> {
    info!("Initializing database pool...");
    let db_config = DieselDatabaseConfig::from_app_config(&config);
    let max_connections = db_config.max_connections;
    let diesel_pool = db::create_diesel_pool(db_config).await?;

    if migrations::should_run_migrations(&config) {
        info!("Running embedded migrations...");
        let migration_config = migrations::MigrationConfig::from_app_config(&config);
        migrations::run_all_migrations(migration_config)
            .await
            .map_err(|e| format!("Migration failed: {}", e))?;
    }

    Ok(AppState {
        config: Arc::new(config),
        diesel_pool,
        max_connections,
    })
}

/// Assemble the `/v1` router. Billing and docs routes depend on configuration.
pub fn build_router(state: AppState) -> Router {
    let mut v1 = Router::new()
        .route("/health", get(health_check))
        .nest("/users", handlers::users_routes())
        .nest("/links", handlers::links_routes())
        .nest("/analytics", handlers::analytics_routes());

    if state.config.billing_enabled() {
        v1 = v1.nest("/billing", handlers::billing_routes());
    } else {
        info!("BILLING_WEBHOOK_SECRET not set, billing callbacks disabled");
    }

    if state.config.enable_openapi {
        v1 = v1.nest("/docs", handlers::docs_routes());
    }

    Router::new()
        .nest("/v1", v1)
        .layer(middleware::cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check: database reachability
#[utoipa::path(
    get,
    path = "/v1/health",
    tag = "Health",
    operation_id = "healthCheck",
    responses(
        (status = 200, description = "Service is healthy"),
        (status = 503, description = "Database unreachable")
    )
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let timestamp = chrono::Utc::now().to_rfc3339();

    let (healthy, postgres_health) = match db::check_diesel_health(&state.diesel_pool).await {
        Ok(_) => (
            true,
            serde_json::json!({
                "status": "healthy",
                "max_connections": state.max_connections,
                "error": null
            }),
        ),
        Err(e) => (
            false,
            serde_json::json!({
                "status": "unhealthy",
                "error": format!("Database connection failed: {}", e)
            }),
        ),
    };

    let response = serde_json::json!({
        "status": if healthy { "healthy" } else { "degraded" },
        "service": "biolink-core",
        "timestamp": timestamp,
        "components": {
            "postgresql": postgres_health
        }
    });

    if healthy {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}
