// Page analytics rows and analytics query parameters

use chrono::{DateTime, Duration, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::schema::page_analytics;

/// Daily page statistics, written by the analytics pipeline
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema)]
#[diesel(table_name = page_analytics)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PageAnalytics {
    pub id: Uuid,
    pub user_id: Uuid,
    pub page_views: i32,
    pub total_clicks: i32,
    pub unique_visitors: i32,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Lookback window for analytics reads
#[derive(Debug, Clone, Copy, Deserialize, Validate, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AnalyticsQuery {
    /// Days to look back, 1-365
    #[serde(default = "default_days")]
    #[validate(range(min = 1, max = 365, message = "days must be between 1 and 365"))]
    pub days: i64,
}

fn default_days() -> i64 {
    30
}

impl Default for AnalyticsQuery {
    fn default() -> Self {
        Self {
            days: default_days(),
        }
    }
}

impl AnalyticsQuery {
    /// Start of the window relative to `now`
    pub fn since(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(self.days)
    }
}
