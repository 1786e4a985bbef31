// Common test utilities and helper structs
// Shared across all test files to avoid duplication

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, Response, StatusCode},
    Router,
};
use biolink_core::{
    app::AppState,
    app_config::AppConfig,
    build_router, initialize_app_state_with, migrations,
    models::{
        link::{CreateLinkRequest, Link},
        subscription::{CreateSubscriptionRequest, SubscriptionStatus},
        user::{CreateUserRequest, User},
    },
    services::{LinkService, SubscriptionService, UserService},
    DieselPool,
};
use serde::Serialize;
use tokio::sync::OnceCell;
use tower::util::ServiceExt;
use uuid::Uuid;

static MIGRATED: OnceCell<()> = OnceCell::const_new();

pub const TEST_BILLING_SECRET: &str = "test-billing-secret-0123456789abcdef";

/// Configuration from `.env.test`, with billing callbacks enabled
pub fn test_config() -> AppConfig {
    dotenv::from_filename(".env.test").ok();

    let mut config = AppConfig::from_env().expect("Failed to load .env.test configuration");
    if config.billing_webhook_secret.is_none() {
        config.billing_webhook_secret = Some(TEST_BILLING_SECRET.to_string());
    }
    config
}

/// Test application wrapper
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
}

impl TestApp {
    pub fn pool(&self) -> DieselPool {
        self.state.diesel_pool.clone()
    }

    pub fn links(&self) -> LinkService {
        LinkService::new(self.pool())
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.pool())
    }

    pub fn subscriptions(&self) -> SubscriptionService {
        SubscriptionService::new(self.pool())
    }

    pub fn get(&self, uri: &str) -> TestRequest<'_> {
        TestRequest::new(self, "GET", uri)
    }

    pub fn post(&self, uri: &str) -> TestRequest<'_> {
        TestRequest::new(self, "POST", uri)
    }

    pub fn put(&self, uri: &str) -> TestRequest<'_> {
        TestRequest::new(self, "PUT", uri)
    }

    pub fn patch(&self, uri: &str) -> TestRequest<'_> {
        TestRequest::new(self, "PATCH", uri)
    }

    pub fn delete(&self, uri: &str) -> TestRequest<'_> {
        TestRequest::new(self, "DELETE", uri)
    }

    /// Register a free-tier user with a unique username
    pub async fn create_user(&self) -> User {
        let username = unique_username();
        self.users()
            .create_user(CreateUserRequest {
                email: format!("{}@example.com", username),
                username,
                display_name: Some("Test User".to_string()),
                avatar_url: None,
                bio: None,
                theme: None,
            })
            .await
            .expect("Failed to create test user")
    }

    /// Register a user and give them an active subscription
    pub async fn create_premium_user(&self) -> User {
        let user = self.create_user().await;
        self.upgrade(user.id).await;
        user
    }

    pub async fn upgrade(&self, user_id: Uuid) {
        self.subscriptions()
            .create_subscription(CreateSubscriptionRequest {
                user_id,
                provider_subscription_id: Some(format!("sub_{}", Uuid::new_v4().simple())),
                status: SubscriptionStatus::Active,
            })
            .await
            .expect("Failed to create subscription");
    }

    /// Fresh copy of the user row
    pub async fn reload_user(&self, user: &User) -> User {
        self.users()
            .get_user_by_username(&user.username)
            .await
            .expect("Failed to load user")
            .expect("user exists")
    }

    pub async fn create_link(&self, user_id: Uuid, title: &str) -> Link {
        self.links()
            .create_link(user_id, link_request(title))
            .await
            .expect("Failed to create test link")
    }
}

pub fn link_request(title: &str) -> CreateLinkRequest {
    CreateLinkRequest {
        title: title.to_string(),
        url: format!("https://example.com/{}", title.to_lowercase()),
        icon: None,
        description: None,
        order_index: None,
    }
}

/// Generate unique username for test isolation
pub fn unique_username() -> String {
    format!("user_{}", &Uuid::new_v4().simple().to_string()[..12])
}

/// Asserts the list is ordered `0..n` with no gaps
pub fn assert_dense(links: &[Link]) {
    let indices: Vec<i32> = links.iter().map(|l| l.order_index).collect();
    let expected: Vec<i32> = (0..links.len() as i32).collect();
    assert_eq!(indices, expected, "order indices must be dense");
}

/// Test request builder
pub struct TestRequest<'a> {
    app: &'a TestApp,
    method: &'static str,
    uri: String,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

impl<'a> TestRequest<'a> {
    fn new(app: &'a TestApp, method: &'static str, uri: &str) -> Self {
        Self {
            app,
            method,
            uri: uri.to_string(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Authenticate as `user_id` the way the gateway does
    pub fn as_user(self, user_id: Uuid) -> Self {
        self.header("x-user-id", &user_id.to_string())
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Add JSON body to request
    pub fn json<T: Serialize>(mut self, body: &T) -> Self {
        self.body = Some(serde_json::to_vec(body).unwrap());
        self.header("content-type", "application/json")
    }

    /// Send the request
    pub async fn send(self) -> TestResponse {
        let mut builder = Request::builder().method(self.method).uri(&self.uri);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let body = self.body.map(Body::from).unwrap_or_else(Body::empty);
        let request = builder.body(body).unwrap();

        let response = self.app.app.clone().oneshot(request).await.unwrap();

        TestResponse { response }
    }
}

/// Test response wrapper
pub struct TestResponse {
    response: Response<Body>,
}

impl TestResponse {
    /// Get status code
    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    /// Parse JSON response
    pub async fn json<T: serde::de::DeserializeOwned>(self) -> T {
        let body = axum::body::to_bytes(self.response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }
}

/// Apply embedded migrations once per test binary
async fn migrate_once(config: &AppConfig) {
    MIGRATED
        .get_or_init(|| async move {
            migrations::run_all_migrations(migrations::MigrationConfig::from_app_config(config))
                .await
                .expect("Failed to run test migrations");
        })
        .await;
}

/// Setup test application with all dependencies
pub async fn setup_test_app() -> TestApp {
    let mut config = test_config();
    migrate_once(&config).await;
    config.disable_embedded_migrations = true;

    let state = initialize_app_state_with(config)
        .await
        .expect("Failed to initialize test application state");
    let app = build_router(state.clone());

    TestApp { app, state }
}
