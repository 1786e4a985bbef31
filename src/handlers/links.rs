// Link management and click recording handlers

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    app::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        link::{
            CreateLinkRequest, Link, LinkLimitsResponse, ReorderLinksRequest, UpdateLinkRequest,
        },
        link_click::{LinkClick, TrackLinkClickRequest},
    },
    services::{click_tracking::ClickRecorder, link::LinkService},
    utils::service_error::ServiceError,
};

fn header_value(headers: &HeaderMap, name: impl header::AsHeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// First hop of `X-Forwarded-For`, if present
fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    header_value(headers, "x-forwarded-for")
        .and_then(|v| v.split(',').next().map(|ip| ip.trim().to_string()))
        .filter(|ip| !ip.is_empty())
}

/// Body fields win; missing ones are filled from request headers
fn merge_click_headers(
    request: TrackLinkClickRequest,
    headers: &HeaderMap,
) -> TrackLinkClickRequest {
    TrackLinkClickRequest {
        ip_address: request.ip_address.or_else(|| forwarded_ip(headers)),
        user_agent: request
            .user_agent
            .or_else(|| header_value(headers, header::USER_AGENT)),
        referrer: request
            .referrer
            .or_else(|| header_value(headers, header::REFERER)),
    }
}

/// Create a link
/// POST /v1/links
#[utoipa::path(
    post,
    path = "/v1/links",
    tag = "Links",
    operation_id = "createLink",
    request_body = CreateLinkRequest,
    responses(
        (status = 201, description = "Link created", body = Link),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Missing or malformed caller identity"),
        (status = 402, description = "Link limit reached for the free tier"),
        (status = 404, description = "User not found")
    ),
    security(("userId" = []))
)]
pub async fn create_link(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(request): Json<CreateLinkRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let link = LinkService::new(state.diesel_pool.clone())
        .create_link(auth_user.user_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(link)))
}

/// List the caller's links in display order
/// GET /v1/links
#[utoipa::path(
    get,
    path = "/v1/links",
    tag = "Links",
    operation_id = "listLinks",
    responses(
        (status = 200, description = "Links in display order", body = [Link]),
        (status = 401, description = "Missing or malformed caller identity")
    ),
    security(("userId" = []))
)]
pub async fn list_links(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let links = LinkService::new(state.diesel_pool.clone())
        .list_links(auth_user.user_id)
        .await?;

    Ok(Json(links))
}

/// Link capacity summary
/// GET /v1/links/limits
#[utoipa::path(
    get,
    path = "/v1/links/limits",
    tag = "Links",
    operation_id = "checkLinkLimits",
    responses(
        (status = 200, description = "Capacity summary, maxLinks is -1 when unlimited", body = LinkLimitsResponse),
        (status = 401, description = "Missing or malformed caller identity"),
        (status = 404, description = "User not found")
    ),
    security(("userId" = []))
)]
pub async fn check_limits(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let limits = LinkService::new(state.diesel_pool.clone())
        .check_limits(auth_user.user_id)
        .await?;

    Ok(Json(limits))
}

/// Reorder links in one batch
/// PUT /v1/links/order
#[utoipa::path(
    put,
    path = "/v1/links/order",
    tag = "Links",
    operation_id = "reorderLinks",
    request_body = ReorderLinksRequest,
    responses(
        (status = 200, description = "Links in their new order", body = [Link]),
        (status = 400, description = "Batch would break dense ordering"),
        (status = 401, description = "Missing or malformed caller identity"),
        (status = 404, description = "A link in the batch was not found")
    ),
    security(("userId" = []))
)]
pub async fn reorder_links(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(request): Json<ReorderLinksRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let links = LinkService::new(state.diesel_pool.clone())
        .reorder_links(auth_user.user_id, request.link_orders)
        .await?;

    Ok(Json(links))
}

/// Partially update a link
/// PATCH /v1/links/{id}
#[utoipa::path(
    patch,
    path = "/v1/links/{id}",
    tag = "Links",
    operation_id = "updateLink",
    params(
        ("id" = Uuid, Path, description = "Link ID (UUID)", example = "123e4567-e89b-12d3-a456-426614174000")
    ),
    request_body = UpdateLinkRequest,
    responses(
        (status = 200, description = "Link updated", body = Link),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Missing or malformed caller identity"),
        (status = 404, description = "Link not found")
    ),
    security(("userId" = []))
)]
pub async fn update_link(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(link_id): Path<Uuid>,
    Json(request): Json<UpdateLinkRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let link = LinkService::new(state.diesel_pool.clone())
        .update_link(link_id, auth_user.user_id, request)
        .await?;

    Ok(Json(link))
}

/// Delete a link
/// DELETE /v1/links/{id}
#[utoipa::path(
    delete,
    path = "/v1/links/{id}",
    tag = "Links",
    operation_id = "deleteLink",
    params(
        ("id" = Uuid, Path, description = "Link ID (UUID)", example = "123e4567-e89b-12d3-a456-426614174000")
    ),
    responses(
        (status = 204, description = "Link deleted, siblings renumbered"),
        (status = 401, description = "Missing or malformed caller identity"),
        (status = 404, description = "Link not found")
    ),
    security(("userId" = []))
)]
pub async fn delete_link(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(link_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    LinkService::new(state.diesel_pool.clone())
        .delete_link(link_id, auth_user.user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Record a click on a public link
/// POST /v1/links/{id}/clicks
#[utoipa::path(
    post,
    path = "/v1/links/{id}/clicks",
    tag = "Clicks",
    operation_id = "recordClick",
    params(
        ("id" = Uuid, Path, description = "Link ID (UUID)", example = "123e4567-e89b-12d3-a456-426614174000")
    ),
    request_body(content = TrackLinkClickRequest, description = "Optional visitor details; header values are used for omitted fields"),
    responses(
        (status = 201, description = "Click recorded", body = LinkClick),
        (status = 404, description = "Link not found")
    )
)]
pub async fn record_click(
    State(state): State<AppState>,
    Path(link_id): Path<Uuid>,
    headers: HeaderMap,
    body: Option<Json<TrackLinkClickRequest>>,
) -> Result<impl IntoResponse, ServiceError> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let request = merge_click_headers(request, &headers);

    let click = ClickRecorder::new(state.diesel_pool.clone())
        .record_click(link_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(click)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_click_details_fall_back_to_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static("Mozilla/5.0"));
        headers.insert(header::REFERER, HeaderValue::from_static("https://example.com/"));
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );

        let merged = merge_click_headers(TrackLinkClickRequest::default(), &headers);
        assert_eq!(merged.ip_address.as_deref(), Some("203.0.113.7"));
        assert_eq!(merged.user_agent.as_deref(), Some("Mozilla/5.0"));
        assert_eq!(merged.referrer.as_deref(), Some("https://example.com/"));
    }

    #[test]
    fn test_click_body_fields_take_precedence() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static("curl/8.0"));

        let request = TrackLinkClickRequest {
            ip_address: None,
            user_agent: Some("Custom Agent".to_string()),
            referrer: None,
        };
        let merged = merge_click_headers(request, &headers);
        assert_eq!(merged.user_agent.as_deref(), Some("Custom Agent"));
        assert_eq!(merged.ip_address, None);
        assert_eq!(merged.referrer, None);
    }
}
