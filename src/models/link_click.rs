// Click events recorded against links

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::schema::link_clicks;

/// Immutable click record. `user_id` is the owner of the clicked link.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema)]
#[diesel(table_name = link_clicks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct LinkClick {
    pub id: Uuid,
    pub link_id: Uuid,
    pub user_id: Uuid,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub country: Option<String>,
    pub clicked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = link_clicks)]
pub struct NewLinkClick {
    pub id: Uuid,
    pub link_id: Uuid,
    pub user_id: Uuid,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub country: Option<String>,
    pub clicked_at: DateTime<Utc>,
}

/// Visitor metadata for a click. All fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "ip_address": "203.0.113.7",
    "user_agent": "Mozilla/5.0",
    "referrer": "https://social.example.com/"
}))]
pub struct TrackLinkClickRequest {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
}

impl NewLinkClick {
    /// Country lookup is not performed, so `country` is always empty.
    pub fn new(link_id: Uuid, owner_id: Uuid, request: TrackLinkClickRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            link_id,
            user_id: owner_id,
            ip_address: request.ip_address,
            user_agent: request.user_agent,
            referrer: request.referrer,
            country: None,
            clicked_at: Utc::now(),
        }
    }
}
