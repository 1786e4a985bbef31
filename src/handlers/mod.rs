// HTTP handlers and route builders, mounted under /v1

pub mod analytics;
pub mod billing;
pub mod docs;
pub mod links;
pub mod users;

use crate::app::AppState;
use axum::{
    routing::{get, patch, post, put},
    Router,
};

// User routes
pub fn users_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(users::create_user))
        .route("/me", patch(users::update_current_user))
        .route("/{username}", get(users::get_user_by_username))
        .route("/{username}/links", get(users::list_public_links))
}

// Link routes
pub fn links_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(links::create_link).get(links::list_links))
        .route("/limits", get(links::check_limits))
        .route("/order", put(links::reorder_links))
        .route(
            "/{id}",
            patch(links::update_link).delete(links::delete_link),
        )
        .route("/{id}/clicks", post(links::record_click))
}

// Analytics routes
pub fn analytics_routes() -> Router<AppState> {
    Router::new()
        .route("/pages", get(analytics::get_page_analytics))
        .route("/clicks", get(analytics::get_click_analytics))
}

// Billing callback routes
pub fn billing_routes() -> Router<AppState> {
    Router::new()
        .route("/subscriptions", post(billing::create_subscription))
        .route(
            "/subscriptions/status",
            put(billing::update_subscription_status),
        )
}

// Documentation routes
pub fn docs_routes() -> Router<AppState> {
    Router::new().route("/openapi.json", get(docs::serve_openapi_spec))
}
