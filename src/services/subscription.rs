// Billing Callback Receiver: subscription events from the payment provider
//
// The only writer of `users.is_premium`. The flag always mirrors whether the
// user's linked subscription is active. A new subscription is only linked
// when it arrives active.

use chrono::{DateTime, Duration, Months, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    db::DieselPool,
    models::{
        subscription::{
            CreateSubscriptionRequest, NewSubscription, Subscription,
            UpdateSubscriptionStatusRequest,
        },
        user::{User, UserUpdate},
    },
    utils::{
        audit_logger::{AuditAction, AuditLogger},
        service_error::ServiceError,
    },
};

/// End of a billing period starting at `start`: one calendar month later
pub fn period_end(start: DateTime<Utc>) -> DateTime<Utc> {
    start
        .checked_add_months(Months::new(1))
        .unwrap_or_else(|| start + Duration::days(30))
}

/// Points the user at `subscription` and derives the premium flag from its status
async fn sync_user_premium(
    conn: &mut AsyncPgConnection,
    user_id: Uuid,
    subscription: &Subscription,
) -> Result<User, ServiceError> {
    let update = UserUpdate {
        is_premium: Some(subscription.status.grants_premium()),
        subscription_id: Some(Some(subscription.id)),
        subscription_status: Some(Some(subscription.status)),
        ..UserUpdate::touch()
    };
    Ok(User::update(conn, user_id, update).await?)
}

#[derive(Clone)]
pub struct SubscriptionService {
    diesel_pool: DieselPool,
}

impl SubscriptionService {
    pub fn new(diesel_pool: DieselPool) -> Self {
        Self { diesel_pool }
    }

    /// Record a new subscription for the current one-month period.
    /// Only an active one replaces the user's linked subscription.
    #[instrument(skip(self, request), fields(user_id = %request.user_id, status = %request.status))]
    pub async fn create_subscription(
        &self,
        request: CreateSubscriptionRequest,
    ) -> Result<Subscription, ServiceError> {
        use crate::schema::subscriptions::dsl;

        let user_id = request.user_id;
        let mut conn = self.diesel_pool.get().await?;

        let (subscription, user) = conn
            .build_transaction()
            .read_committed()
            .run::<_, ServiceError, _>(|conn| {
                Box::pin(async move {
                    let user = User::find_for_update(conn, user_id).await?;

                    let now = Utc::now();
                    let new_subscription = NewSubscription {
                        id: Uuid::new_v4(),
                        user_id,
                        provider_subscription_id: request.provider_subscription_id,
                        status: request.status,
                        current_period_start: now,
                        current_period_end: period_end(now),
                        created_at: now,
                        updated_at: now,
                    };

                    let subscription = diesel::insert_into(dsl::subscriptions)
                        .values(&new_subscription)
                        .returning(Subscription::as_returning())
                        .get_result::<Subscription>(conn)
                        .await?;

                    let user = if subscription.status.grants_premium() {
                        sync_user_premium(conn, user_id, &subscription).await?
                    } else {
                        user
                    };
                    Ok((subscription, user))
                })
            })
            .await?;

        info!(
            "Created subscription {} for user {} (premium: {})",
            subscription.id, user_id, user.is_premium
        );
        AuditLogger::log(
            AuditAction::SubscriptionCreated,
            user_id,
            Some(subscription.id.to_string()),
            Some(format!("status: {}", subscription.status)),
        );

        Ok(subscription)
    }

    /// Change the status of the user's subscription. `None` when the user has none.
    #[instrument(skip(self, request), fields(user_id = %request.user_id, status = %request.status))]
    pub async fn update_subscription_status(
        &self,
        request: UpdateSubscriptionStatusRequest,
    ) -> Result<Option<Subscription>, ServiceError> {
        use crate::schema::subscriptions::dsl;

        let user_id = request.user_id;
        let status = request.status;
        let mut conn = self.diesel_pool.get().await?;

        let updated = conn
            .build_transaction()
            .read_committed()
            .run::<_, ServiceError, _>(|conn| {
                Box::pin(async move {
                    let user = User::find_for_update(conn, user_id).await?;

                    // Prefer the linked subscription, fall back to the newest one
                    let current = match user.subscription_id {
                        Some(subscription_id) => dsl::subscriptions
                            .find(subscription_id)
                            .select(Subscription::as_select())
                            .first::<Subscription>(conn)
                            .await
                            .optional()?,
                        None => None,
                    };
                    let current = match current {
                        Some(subscription) => Some(subscription),
                        None => dsl::subscriptions
                            .filter(dsl::user_id.eq(user_id))
                            .order(dsl::created_at.desc())
                            .select(Subscription::as_select())
                            .first::<Subscription>(conn)
                            .await
                            .optional()?,
                    };

                    let Some(current) = current else {
                        return Ok(None);
                    };

                    let subscription = diesel::update(dsl::subscriptions.find(current.id))
                        .set((dsl::status.eq(status), dsl::updated_at.eq(Utc::now())))
                        .returning(Subscription::as_returning())
                        .get_result::<Subscription>(conn)
                        .await?;

                    sync_user_premium(conn, user_id, &subscription).await?;
                    Ok(Some(subscription))
                })
            })
            .await?;

        match &updated {
            Some(subscription) => {
                info!(
                    "Subscription {} for user {} is now {}",
                    subscription.id, user_id, status
                );
                AuditLogger::log(
                    AuditAction::SubscriptionStatusChanged,
                    user_id,
                    Some(subscription.id.to_string()),
                    Some(format!("status: {}", status)),
                );
            },
            None => info!("User {} has no subscription to update", user_id),
        }

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_period_is_one_calendar_month() {
        let start = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        assert_eq!(
            period_end(start),
            Utc.with_ymd_and_hms(2026, 2, 15, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_period_end_clamps_short_months() {
        let start = Utc.with_ymd_and_hms(2026, 1, 31, 0, 0, 0).unwrap();
        assert_eq!(
            period_end(start),
            Utc.with_ymd_and_hms(2026, 2, 28, 0, 0, 0).unwrap()
        );
    }
}
