// API documentation: OpenAPI document generated from handler annotations

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};

use crate::{
    app::AppState,
    app_config::AppConfig,
    handlers::{analytics, billing, links, users},
    middleware::auth::{BILLING_SECRET_HEADER, USER_ID_HEADER},
    models::{
        analytics::{AnalyticsQuery, PageAnalytics},
        link::{
            CreateLinkRequest, Link, LinkLimitsResponse, LinkOrder, ReorderLinksRequest,
            UpdateLinkRequest,
        },
        link_click::{LinkClick, TrackLinkClickRequest},
        subscription::{
            CreateSubscriptionRequest, Subscription, SubscriptionStatus,
            UpdateSubscriptionStatusRequest,
        },
        user::{CreateUserRequest, Theme, UpdateUserRequest, User, UserProfile},
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "userId",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(USER_ID_HEADER))),
            );
            components.add_security_scheme(
                "billingSecret",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(BILLING_SECRET_HEADER))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Biolink API",
        description = "Link-in-bio backend: ordered link lists, click tracking and premium analytics"
    ),
    paths(
        crate::health_check,
        users::create_user,
        users::update_current_user,
        users::get_user_by_username,
        users::list_public_links,
        links::create_link,
        links::list_links,
        links::check_limits,
        links::reorder_links,
        links::update_link,
        links::delete_link,
        links::record_click,
        analytics::get_page_analytics,
        analytics::get_click_analytics,
        billing::create_subscription,
        billing::update_subscription_status,
    ),
    components(schemas(
        User,
        UserProfile,
        Theme,
        CreateUserRequest,
        UpdateUserRequest,
        Link,
        CreateLinkRequest,
        UpdateLinkRequest,
        LinkOrder,
        ReorderLinksRequest,
        LinkLimitsResponse,
        LinkClick,
        TrackLinkClickRequest,
        PageAnalytics,
        AnalyticsQuery,
        Subscription,
        SubscriptionStatus,
        CreateSubscriptionRequest,
        UpdateSubscriptionStatusRequest,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health checks"),
        (name = "Users", description = "Registration, profiles and public pages"),
        (name = "Links", description = "Ordered link management"),
        (name = "Clicks", description = "Click recording"),
        (name = "Analytics", description = "Premium analytics"),
        (name = "Billing", description = "Payment provider callbacks")
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI document. Billing paths are dropped when billing is disabled.
pub fn build_openapi_spec(config: &AppConfig) -> utoipa::openapi::OpenApi {
    let mut spec = ApiDoc::openapi();
    if !config.billing_enabled() {
        spec.paths
            .paths
            .retain(|path, _| !path.starts_with("/v1/billing"));
    }
    spec
}

/// Serve OpenAPI JSON specification at /v1/docs/openapi.json
pub async fn serve_openapi_spec(State(app_state): State<AppState>) -> Response {
    let spec = build_openapi_spec(app_state.config.as_ref());

    match spec.to_json() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to serialize OpenAPI document: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        },
    }
}
