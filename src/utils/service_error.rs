// Service error type shared by every handler
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use crate::models::user::UserError;
use crate::services::capacity::LinkCapacity;
use crate::services::ordering::OrderingError;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found")]
    NotFound,

    /// The resource exists but belongs to someone else
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Links not owned by caller: {0:?}")]
    InvalidOwnership(Vec<Uuid>),

    #[error("Link limit reached ({max_links:?})")]
    CapacityExceeded { max_links: LinkCapacity },

    #[error("Premium subscription required")]
    PremiumRequired,

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl ServiceError {
    /// Stable machine-readable code for the response body
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::DatabaseError(_) => "DATABASE_ERROR",
            ServiceError::ValidationError(_) => "VALIDATION_ERROR",
            // Ownership failures are reported as missing resources
            ServiceError::NotFound
            | ServiceError::Unauthorized
            | ServiceError::InvalidOwnership(_) => "NOT_FOUND",
            ServiceError::CapacityExceeded { .. } => "CAPACITY_EXCEEDED",
            ServiceError::PremiumRequired => "PREMIUM_REQUIRED",
            ServiceError::Conflict(_) => "CONFLICT",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound
            | ServiceError::Unauthorized
            | ServiceError::InvalidOwnership(_) => StatusCode::NOT_FOUND,
            ServiceError::CapacityExceeded { .. } | ServiceError::PremiumRequired => {
                StatusCode::PAYMENT_REQUIRED
            },
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message = match &self {
            ServiceError::DatabaseError(msg) => {
                error!("Database failure: {}", msg);
                "Internal server error".to_string()
            },
            ServiceError::ValidationError(msg) => msg.clone(),
            ServiceError::NotFound
            | ServiceError::Unauthorized
            | ServiceError::InvalidOwnership(_) => "Resource not found".to_string(),
            ServiceError::CapacityExceeded { max_links } => match max_links {
                LinkCapacity::Limited(max) => format!(
                    "Free users are limited to {} links. Upgrade to premium for unlimited links.",
                    max
                ),
                LinkCapacity::Unlimited => "Link limit reached".to_string(),
            },
            ServiceError::PremiumRequired => {
                "Analytics are only available for premium users".to_string()
            },
            ServiceError::Conflict(msg) => msg.clone(),
        };

        let body = Json(json!({
            "kind": self.kind(),
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

// Conversion from various error types
impl From<DieselError> for ServiceError {
    fn from(error: DieselError) -> Self {
        match error {
            DieselError::NotFound => ServiceError::NotFound,
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                ServiceError::Conflict(info.message().to_string())
            },
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                ServiceError::NotFound
            },
            _ => ServiceError::DatabaseError(error.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(error: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(error.to_string())
    }
}

impl From<OrderingError> for ServiceError {
    fn from(error: OrderingError) -> Self {
        match error {
            OrderingError::UnknownLinks(ids) => ServiceError::InvalidOwnership(ids),
            other => ServiceError::ValidationError(other.to_string()),
        }
    }
}

impl From<UserError> for ServiceError {
    fn from(error: UserError) -> Self {
        match error {
            UserError::NotFound => ServiceError::NotFound,
            UserError::EmailTaken => ServiceError::Conflict("Email already registered".to_string()),
            UserError::UsernameTaken => {
                ServiceError::Conflict("Username already taken".to_string())
            },
            UserError::Database(e) => ServiceError::from(e),
        }
    }
}

impl From<bb8::RunError<diesel_async::pooled_connection::PoolError>> for ServiceError {
    fn from(error: bb8::RunError<diesel_async::pooled_connection::PoolError>) -> Self {
        ServiceError::DatabaseError(format!("Connection pool error: {}", error))
    }
}
