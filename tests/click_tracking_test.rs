// Click recording and premium analytics tests against a real database

mod common;

use biolink_core::{
    models::{
        analytics::AnalyticsQuery, link::UpdateLinkRequest, link_click::TrackLinkClickRequest,
    },
    schema::links,
    services::{AnalyticsService, ClickRecorder},
    ServiceError,
};
use common::setup_test_app;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

#[tokio::test]
#[ignore] // Requires database
async fn test_each_click_increments_counter_and_appends_event() {
    let app = setup_test_app().await;
    let user = app.create_premium_user().await;
    let link = app.create_link(user.id, "Clicked").await;

    let recorder = ClickRecorder::new(app.pool());
    for i in 0..4 {
        let click = recorder
            .record_click(
                link.id,
                TrackLinkClickRequest {
                    ip_address: Some(format!("203.0.113.{}", i)),
                    user_agent: Some("Mozilla/5.0".to_string()),
                    referrer: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(click.link_id, link.id);
        assert_eq!(click.user_id, user.id);
        assert_eq!(click.country, None);
    }

    let links = app.links().list_links(user.id).await.unwrap();
    assert_eq!(links[0].click_count, 4);

    let clicks = AnalyticsService::new(app.pool())
        .get_link_analytics(user.id, AnalyticsQuery::default())
        .await
        .unwrap();
    assert_eq!(clicks.len(), 4);
    assert!(clicks.windows(2).all(|w| w[0].clicked_at >= w[1].clicked_at));
}

#[tokio::test]
#[ignore] // Requires database
async fn test_clicks_on_inactive_links_are_counted() {
    let app = setup_test_app().await;
    let user = app.create_user().await;
    let link = app.create_link(user.id, "Hidden").await;

    app.links()
        .update_link(
            link.id,
            user.id,
            UpdateLinkRequest {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    ClickRecorder::new(app.pool())
        .record_click(link.id, TrackLinkClickRequest::default())
        .await
        .unwrap();

    let links = app.links().list_links(user.id).await.unwrap();
    assert_eq!(links[0].click_count, 1);
}

#[tokio::test]
#[ignore] // Requires database
async fn test_click_counter_passes_32_bit_range() {
    let app = setup_test_app().await;
    let user = app.create_user().await;
    let link = app.create_link(user.id, "Viral").await;

    let pool = app.pool();
    let mut conn = pool.get().await.unwrap();
    diesel::update(links::table.find(link.id))
        .set(links::click_count.eq(i64::from(i32::MAX)))
        .execute(&mut conn)
        .await
        .unwrap();
    drop(conn);

    ClickRecorder::new(app.pool())
        .record_click(link.id, TrackLinkClickRequest::default())
        .await
        .unwrap();

    let links = app.links().list_links(user.id).await.unwrap();
    assert_eq!(links[0].click_count, i64::from(i32::MAX) + 1);
}

#[tokio::test]
#[ignore] // Requires database
async fn test_click_on_unknown_link_is_not_found() {
    let app = setup_test_app().await;

    let err = ClickRecorder::new(app.pool())
        .record_click(Uuid::new_v4(), TrackLinkClickRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound));
}

#[tokio::test]
#[ignore] // Requires database
async fn test_analytics_require_premium() {
    let app = setup_test_app().await;
    let user = app.create_user().await;
    let analytics = AnalyticsService::new(app.pool());

    let err = analytics
        .get_user_analytics(user.id, AnalyticsQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::PremiumRequired));

    let err = analytics
        .get_link_analytics(user.id, AnalyticsQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::PremiumRequired));

    let err = analytics
        .get_user_analytics(Uuid::new_v4(), AnalyticsQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound));
}

#[tokio::test]
#[ignore] // Requires database
async fn test_analytics_window_is_validated() {
    let app = setup_test_app().await;
    let user = app.create_premium_user().await;
    let analytics = AnalyticsService::new(app.pool());

    let err = analytics
        .get_user_analytics(user.id, AnalyticsQuery { days: 0 })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));

    let rows = analytics
        .get_user_analytics(user.id, AnalyticsQuery { days: 365 })
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
#[ignore] // Requires database
async fn test_link_analytics_only_include_own_links() {
    let app = setup_test_app().await;
    let owner = app.create_premium_user().await;
    let other = app.create_user().await;

    let own_link = app.create_link(owner.id, "Own").await;
    let other_link = app.create_link(other.id, "Other").await;

    let recorder = ClickRecorder::new(app.pool());
    recorder
        .record_click(own_link.id, TrackLinkClickRequest::default())
        .await
        .unwrap();
    recorder
        .record_click(other_link.id, TrackLinkClickRequest::default())
        .await
        .unwrap();

    let clicks = AnalyticsService::new(app.pool())
        .get_link_analytics(owner.id, AnalyticsQuery { days: 1 })
        .await
        .unwrap();
    assert_eq!(clicks.len(), 1);
    assert_eq!(clicks[0].link_id, own_link.id);
}
