// Link model and request/response DTOs

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::schema::links;
use crate::services::capacity::LinkCapacity;
use crate::utils::validation::{deserialize_some, trim_nullable_field, trim_optional_field};

// =============================================================================
// DATABASE MODELS
// =============================================================================

/// Link model representing a database record
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema)]
#[diesel(table_name = links)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[schema(example = json!({
    "id": "123e4567-e89b-12d3-a456-426614174000",
    "user_id": "123e4567-e89b-12d3-a456-426614174001",
    "title": "My portfolio",
    "url": "https://example.com/portfolio",
    "icon": "🎨",
    "description": "Selected work from the last five years",
    "order_index": 0,
    "is_active": true,
    "click_count": 42,
    "created_at": "2026-01-01T12:00:00Z",
    "updated_at": "2026-01-01T12:00:00Z"
}))]
pub struct Link {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub url: String,
    pub icon: Option<String>,
    pub description: Option<String>,
    pub order_index: i32,
    pub is_active: bool,
    pub click_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New link for insertion
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = links)]
pub struct NewLink {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub url: String,
    pub icon: Option<String>,
    pub description: Option<String>,
    pub order_index: i32,
    pub is_active: bool,
    pub click_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Update link fields. `order_index` and `click_count` are never written here.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = links)]
pub struct UpdateLink {
    pub title: Option<String>,
    pub url: Option<String>,
    pub icon: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// REQUEST/RESPONSE DTOs
// =============================================================================

/// Request to create a new link
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "title": "My portfolio",
    "url": "https://example.com/portfolio",
    "icon": "🎨",
    "description": "Selected work from the last five years",
    "order_index": null
}))]
pub struct CreateLinkRequest {
    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: String,

    #[validate(url(message = "Invalid URL format"))]
    pub url: String,

    #[validate(length(max = 255, message = "Icon must be at most 255 characters"))]
    pub icon: Option<String>,

    #[validate(length(max = 200, message = "Description must be at most 200 characters"))]
    pub description: Option<String>,

    /// Insert at this position instead of appending. Clamped to the list bounds.
    pub order_index: Option<i32>,
}

impl CreateLinkRequest {
    /// Trim and sanitize input fields
    pub fn sanitize(&mut self) {
        self.title = self.title.trim().to_string();
        self.url = self.url.trim().to_string();
        self.icon = trim_optional_field(self.icon.as_ref());
        self.description = trim_optional_field(self.description.as_ref());
    }
}

/// Request to update an existing link. An explicit `null` clears `icon` or `description`.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "title": "Updated title",
    "description": null,
    "is_active": false
}))]
pub struct UpdateLinkRequest {
    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: Option<String>,

    #[validate(url(message = "Invalid URL format"))]
    pub url: Option<String>,

    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub icon: Option<Option<String>>,

    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,

    /// Move the link to this position. Clamped to the list bounds.
    pub order_index: Option<i32>,

    pub is_active: Option<bool>,
}

impl UpdateLinkRequest {
    pub fn sanitize(&mut self) {
        self.title = self.title.as_ref().map(|s| s.trim().to_string());
        self.url = self.url.as_ref().map(|s| s.trim().to_string());
        self.icon = trim_nullable_field(self.icon.as_ref());
        self.description = trim_nullable_field(self.description.as_ref());
    }

    pub fn validate_custom(&self) -> Result<(), String> {
        use crate::utils::validation::validate_nullable_length;

        validate_nullable_length("Icon", &self.icon, 255)?;
        validate_nullable_length("Description", &self.description, 200)?;
        Ok(())
    }

    /// Column changes carried by this request, with a fresh `updated_at`
    pub fn to_changeset(&self) -> UpdateLink {
        UpdateLink {
            title: self.title.clone(),
            url: self.url.clone(),
            icon: self.icon.clone(),
            description: self.description.clone(),
            is_active: self.is_active,
            updated_at: Utc::now(),
        }
    }
}

/// One entry of a reorder batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LinkOrder {
    pub id: Uuid,
    pub order_index: i32,
}

/// Request to reorder the caller's links
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "link_orders": [
        { "id": "123e4567-e89b-12d3-a456-426614174000", "order_index": 1 },
        { "id": "123e4567-e89b-12d3-a456-426614174001", "order_index": 0 }
    ]
}))]
pub struct ReorderLinksRequest {
    pub link_orders: Vec<LinkOrder>,
}

/// Capacity summary for the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "canCreateLink": true,
    "linkCount": 3,
    "maxLinks": 5,
    "isPremium": false
}))]
pub struct LinkLimitsResponse {
    pub can_create_link: bool,
    pub link_count: i64,
    /// `-1` when unlimited
    #[schema(value_type = i64)]
    pub max_links: LinkCapacity,
    pub is_premium: bool,
}
