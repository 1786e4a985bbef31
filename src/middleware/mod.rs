// Request extractors for caller identity, plus the CORS policy

pub mod auth;
pub mod cors;

pub use auth::{AuthenticatedUser, BillingCaller};
pub use cors::cors_layer;
