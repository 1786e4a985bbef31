// Billing callback handlers, mounted only when a webhook secret is configured

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    app::AppState,
    middleware::auth::BillingCaller,
    models::subscription::{
        CreateSubscriptionRequest, Subscription, UpdateSubscriptionStatusRequest,
    },
    services::subscription::SubscriptionService,
    utils::service_error::ServiceError,
};

/// Subscription created by the payment provider
/// POST /v1/billing/subscriptions
#[utoipa::path(
    post,
    path = "/v1/billing/subscriptions",
    tag = "Billing",
    operation_id = "createSubscription",
    request_body = CreateSubscriptionRequest,
    responses(
        (status = 201, description = "Subscription recorded", body = Subscription),
        (status = 401, description = "Invalid billing credentials"),
        (status = 404, description = "User not found")
    ),
    security(("billingSecret" = []))
)]
pub async fn create_subscription(
    State(state): State<AppState>,
    _caller: BillingCaller,
    Json(request): Json<CreateSubscriptionRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let subscription = SubscriptionService::new(state.diesel_pool.clone())
        .create_subscription(request)
        .await?;

    Ok((StatusCode::CREATED, Json(subscription)))
}

/// Subscription status changed at the payment provider
/// PUT /v1/billing/subscriptions/status
#[utoipa::path(
    put,
    path = "/v1/billing/subscriptions/status",
    tag = "Billing",
    operation_id = "updateSubscriptionStatus",
    request_body = UpdateSubscriptionStatusRequest,
    responses(
        (status = 200, description = "Subscription updated", body = Subscription),
        (status = 401, description = "Invalid billing credentials"),
        (status = 404, description = "Unknown user, or the user has no subscription")
    ),
    security(("billingSecret" = []))
)]
pub async fn update_subscription_status(
    State(state): State<AppState>,
    _caller: BillingCaller,
    Json(request): Json<UpdateSubscriptionStatusRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let subscription = SubscriptionService::new(state.diesel_pool.clone())
        .update_subscription_status(request)
        .await?
        .ok_or(ServiceError::NotFound)?;

    Ok(Json(subscription))
}
