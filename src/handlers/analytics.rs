// Premium analytics handlers

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};

use crate::{
    app::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        analytics::{AnalyticsQuery, PageAnalytics},
        link_click::LinkClick,
    },
    services::analytics::AnalyticsService,
    utils::service_error::ServiceError,
};

/// Daily page statistics
/// GET /v1/analytics/pages?days=30
#[utoipa::path(
    get,
    path = "/v1/analytics/pages",
    tag = "Analytics",
    operation_id = "getPageAnalytics",
    params(AnalyticsQuery),
    responses(
        (status = 200, description = "Daily statistics, newest first", body = [PageAnalytics]),
        (status = 400, description = "days out of range"),
        (status = 401, description = "Missing or malformed caller identity"),
        (status = 402, description = "Premium subscription required"),
        (status = 404, description = "User not found")
    ),
    security(("userId" = []))
)]
pub async fn get_page_analytics(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Query(query): Query<AnalyticsQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let rows = AnalyticsService::new(state.diesel_pool.clone())
        .get_user_analytics(auth_user.user_id, query)
        .await?;

    Ok(Json(rows))
}

/// Raw click events on the caller's links
/// GET /v1/analytics/clicks?days=30
#[utoipa::path(
    get,
    path = "/v1/analytics/clicks",
    tag = "Analytics",
    operation_id = "getClickAnalytics",
    params(AnalyticsQuery),
    responses(
        (status = 200, description = "Click events, newest first", body = [LinkClick]),
        (status = 400, description = "days out of range"),
        (status = 401, description = "Missing or malformed caller identity"),
        (status = 402, description = "Premium subscription required"),
        (status = 404, description = "User not found")
    ),
    security(("userId" = []))
)]
pub async fn get_click_analytics(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Query(query): Query<AnalyticsQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let clicks = AnalyticsService::new(state.diesel_pool.clone())
        .get_link_analytics(auth_user.user_id, query)
        .await?;

    Ok(Json(clicks))
}
