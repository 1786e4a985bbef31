// Analytics Reader: premium-gated page statistics and click history

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::{debug, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DieselPool,
    models::{
        analytics::{AnalyticsQuery, PageAnalytics},
        link_click::LinkClick,
        user::User,
    },
    utils::service_error::ServiceError,
};

#[derive(Clone)]
pub struct AnalyticsService {
    diesel_pool: DieselPool,
}

impl AnalyticsService {
    pub fn new(diesel_pool: DieselPool) -> Self {
        Self { diesel_pool }
    }

    /// Daily page statistics within the window, newest first
    #[instrument(skip(self))]
    pub async fn get_user_analytics(
        &self,
        user_id: Uuid,
        query: AnalyticsQuery,
    ) -> Result<Vec<PageAnalytics>, ServiceError> {
        use crate::schema::page_analytics::dsl;

        query.validate()?;

        let mut conn = self.diesel_pool.get().await?;
        let user = User::find_by_id(&mut conn, user_id).await?;
        if !user.is_premium {
            return Err(ServiceError::PremiumRequired);
        }

        let since = query.since(Utc::now());
        let rows = dsl::page_analytics
            .filter(dsl::user_id.eq(user.id))
            .filter(dsl::date.ge(since))
            .order(dsl::date.desc())
            .select(PageAnalytics::as_select())
            .load::<PageAnalytics>(&mut conn)
            .await?;

        debug!("Loaded {} analytics rows for user {}", rows.len(), user_id);
        Ok(rows)
    }

    /// Click events on the user's links within the window, newest first
    #[instrument(skip(self))]
    pub async fn get_link_analytics(
        &self,
        user_id: Uuid,
        query: AnalyticsQuery,
    ) -> Result<Vec<LinkClick>, ServiceError> {
        use crate::schema::{link_clicks, links};

        query.validate()?;

        let mut conn = self.diesel_pool.get().await?;
        let user = User::find_by_id(&mut conn, user_id).await?;
        if !user.is_premium {
            return Err(ServiceError::PremiumRequired);
        }

        let since = query.since(Utc::now());
        let clicks = link_clicks::table
            .inner_join(links::table)
            .filter(links::user_id.eq(user.id))
            .filter(link_clicks::clicked_at.ge(since))
            .order(link_clicks::clicked_at.desc())
            .select(LinkClick::as_select())
            .load::<LinkClick>(&mut conn)
            .await?;

        debug!("Loaded {} clicks for user {}", clicks.len(), user_id);
        Ok(clicks)
    }
}
