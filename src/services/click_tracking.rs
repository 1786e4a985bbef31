// Click Recorder: appends click events and maintains the denormalized counter

use chrono::Utc;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::RunQueryDsl;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::{
    db::DieselPool,
    models::link_click::{LinkClick, NewLinkClick, TrackLinkClickRequest},
    utils::{
        audit_logger::{AuditAction, AuditLogger},
        service_error::ServiceError,
    },
};

/// Longest user agent or referrer kept verbatim
const MAX_HEADER_VALUE_LEN: usize = 1024;

fn truncate(value: Option<String>) -> Option<String> {
    value.map(|v| {
        if v.chars().count() > MAX_HEADER_VALUE_LEN {
            v.chars().take(MAX_HEADER_VALUE_LEN).collect()
        } else {
            v
        }
    })
}

#[derive(Clone)]
pub struct ClickRecorder {
    diesel_pool: DieselPool,
}

impl ClickRecorder {
    pub fn new(diesel_pool: DieselPool) -> Self {
        Self { diesel_pool }
    }

    /// Record one click. The counter increment and the event insert commit together.
    ///
    /// Clicks are counted on inactive links too; visibility is a listing concern.
    #[instrument(skip(self, request))]
    pub async fn record_click(
        &self,
        link_id: Uuid,
        request: TrackLinkClickRequest,
    ) -> Result<LinkClick, ServiceError> {
        use crate::schema::{link_clicks, links};

        let request = TrackLinkClickRequest {
            ip_address: truncate(request.ip_address),
            user_agent: truncate(request.user_agent),
            referrer: truncate(request.referrer),
        };

        let mut conn = self.diesel_pool.get().await?;

        let click = conn
            .build_transaction()
            .read_committed()
            .run::<_, ServiceError, _>(|conn| {
                Box::pin(async move {
                    let owner_id = diesel::update(links::table.find(link_id))
                        .set((
                            links::click_count.eq(links::click_count + 1),
                            links::updated_at.eq(Utc::now()),
                        ))
                        .returning(links::user_id)
                        .get_result::<Uuid>(conn)
                        .await
                        .map_err(|e| match e {
                            DieselError::NotFound => ServiceError::NotFound,
                            other => ServiceError::from(other),
                        })?;

                    let new_click = NewLinkClick::new(link_id, owner_id, request);
                    let click = diesel::insert_into(link_clicks::table)
                        .values(&new_click)
                        .returning(LinkClick::as_returning())
                        .get_result::<LinkClick>(conn)
                        .await?;

                    Ok(click)
                })
            })
            .await?;

        debug!("Recorded click {} on link {}", click.id, link_id);
        AuditLogger::log_link_action(AuditAction::LinkClicked, click.user_id, link_id, None);

        Ok(click)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_long_values() {
        let long = "a".repeat(MAX_HEADER_VALUE_LEN + 50);
        let truncated = truncate(Some(long)).unwrap();
        assert_eq!(truncated.chars().count(), MAX_HEADER_VALUE_LEN);

        assert_eq!(truncate(Some("short".into())), Some("short".to_string()));
        assert_eq!(truncate(None), None);
    }
}
