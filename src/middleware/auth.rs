// Caller identity and billing-collaborator extractors
//
// Authentication happens upstream: the gateway resolves the session and
// forwards the caller's id in `X-User-Id`.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use subtle::ConstantTimeEq;
use tracing::warn;
use uuid::Uuid;

use crate::app::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const BILLING_SECRET_HEADER: &str = "x-billing-secret";

pub type AuthRejection = (StatusCode, Json<Value>);

fn unauthenticated(message: &str) -> AuthRejection {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "kind": "UNAUTHENTICATED",
            "error": message,
            "status": StatusCode::UNAUTHORIZED.as_u16()
        })),
    )
}

/// Caller identity forwarded by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

impl AuthenticatedUser {
    pub fn from_parts(parts: &Parts) -> Result<Self, AuthRejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| unauthenticated("Authentication required"))?;

        raw.to_str()
            .ok()
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
            .map(|user_id| AuthenticatedUser { user_id })
            .ok_or_else(|| unauthenticated("Malformed caller identity"))
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_parts(parts)
    }
}

/// Proof that the request came from the billing collaborator
#[derive(Debug, Clone, Copy)]
pub struct BillingCaller;

/// Constant-time comparison of the presented secret against the configured one
pub fn billing_secret_matches(presented: &str, expected: &str) -> bool {
    presented.as_bytes().ct_eq(expected.as_bytes()).into()
}

impl FromRequestParts<AppState> for BillingCaller {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let expected = state
            .config
            .billing_webhook_secret
            .as_deref()
            .ok_or_else(|| unauthenticated("Billing callbacks are disabled"))?;

        let presented = parts
            .headers
            .get(BILLING_SECRET_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        if billing_secret_matches(presented, expected) {
            Ok(BillingCaller)
        } else {
            warn!("Rejected billing callback with invalid secret");
            Err(unauthenticated("Invalid billing credentials"))
        }
    }
}
