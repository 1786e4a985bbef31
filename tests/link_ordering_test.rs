// Link ordering, capacity and ownership tests against a real database

mod common;

use biolink_core::{
    models::{
        link::{CreateLinkRequest, LinkOrder, UpdateLinkRequest},
        subscription::{
            CreateSubscriptionRequest, SubscriptionStatus, UpdateSubscriptionStatusRequest,
        },
    },
    services::{LinkCapacity, LinkService},
    ServiceError,
};
use common::{assert_dense, link_request, setup_test_app};
use tokio::task::JoinSet;
use uuid::Uuid;

#[tokio::test]
#[ignore] // Requires database
async fn test_created_links_are_contiguous() {
    let app = setup_test_app().await;
    let user = app.create_user().await;

    for (expected, title) in ["Alpha", "Beta", "Gamma"].iter().enumerate() {
        let link = app.create_link(user.id, title).await;
        assert_eq!(link.order_index, expected as i32);
        assert!(link.is_active);
        assert_eq!(link.click_count, 0);
    }

    let links = app.links().list_links(user.id).await.unwrap();
    assert_eq!(links.len(), 3);
    assert_dense(&links);
    let titles: Vec<&str> = links.iter().map(|l| l.title.as_str()).collect();
    assert_eq!(titles, vec!["Alpha", "Beta", "Gamma"]);
}

#[tokio::test]
#[ignore] // Requires database
async fn test_delete_middle_link_renumbers_siblings() {
    let app = setup_test_app().await;
    let user = app.create_user().await;

    let a = app.create_link(user.id, "A").await;
    let b = app.create_link(user.id, "B").await;
    let c = app.create_link(user.id, "C").await;

    app.links().delete_link(b.id, user.id).await.unwrap();

    let links = app.links().list_links(user.id).await.unwrap();
    assert_eq!(links.len(), 2);
    assert_eq!(links[0].id, a.id);
    assert_eq!(links[0].order_index, 0);
    assert_eq!(links[1].id, c.id);
    assert_eq!(links[1].order_index, 1);
}

#[tokio::test]
#[ignore] // Requires database
async fn test_insert_at_requested_position_shifts_siblings() {
    let app = setup_test_app().await;
    let user = app.create_user().await;

    let a = app.create_link(user.id, "A").await;
    let b = app.create_link(user.id, "B").await;

    let front = app
        .links()
        .create_link(
            user.id,
            CreateLinkRequest {
                order_index: Some(0),
                ..link_request("Front")
            },
        )
        .await
        .unwrap();
    assert_eq!(front.order_index, 0);

    // Far past the end is clamped to an append
    let tail = app
        .links()
        .create_link(
            user.id,
            CreateLinkRequest {
                order_index: Some(99),
                ..link_request("Tail")
            },
        )
        .await
        .unwrap();
    assert_eq!(tail.order_index, 3);

    let links = app.links().list_links(user.id).await.unwrap();
    assert_dense(&links);
    let ids: Vec<Uuid> = links.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![front.id, a.id, b.id, tail.id]);
}

#[tokio::test]
#[ignore] // Requires database
async fn test_update_order_index_moves_link() {
    let app = setup_test_app().await;
    let user = app.create_user().await;

    let a = app.create_link(user.id, "A").await;
    let b = app.create_link(user.id, "B").await;
    let c = app.create_link(user.id, "C").await;

    let moved = app
        .links()
        .update_link(
            c.id,
            user.id,
            UpdateLinkRequest {
                order_index: Some(0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.order_index, 0);

    let links = app.links().list_links(user.id).await.unwrap();
    assert_dense(&links);
    let ids: Vec<Uuid> = links.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![c.id, a.id, b.id]);
}

#[tokio::test]
#[ignore] // Requires database
async fn test_free_tier_limit_counts_inactive_links() {
    let app = setup_test_app().await;
    let user = app.create_user().await;

    let mut first = None;
    for i in 0..5 {
        let link = app.create_link(user.id, &format!("Link{}", i)).await;
        first.get_or_insert(link.id);
    }

    // Deactivating does not free a slot
    app.links()
        .update_link(
            first.unwrap(),
            user.id,
            UpdateLinkRequest {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let err = app
        .links()
        .create_link(user.id, link_request("Sixth"))
        .await
        .unwrap_err();
    assert!(
        matches!(
            err,
            ServiceError::CapacityExceeded {
                max_links: LinkCapacity::Limited(5)
            }
        ),
        "unexpected error: {:?}",
        err
    );

    let limits = app.links().check_limits(user.id).await.unwrap();
    assert!(!limits.can_create_link);
    assert_eq!(limits.link_count, 5);
    assert_eq!(limits.max_links, LinkCapacity::Limited(5));
    assert!(!limits.is_premium);

    // Failed creation left the list untouched
    let links = app.links().list_links(user.id).await.unwrap();
    assert_eq!(links.len(), 5);
    assert_dense(&links);
}

#[tokio::test]
#[ignore] // Requires database
async fn test_upgrade_unlocks_sixth_link() {
    let app = setup_test_app().await;
    let user = app.create_user().await;

    for i in 0..5 {
        app.create_link(user.id, &format!("Link{}", i)).await;
    }
    assert!(app
        .links()
        .create_link(user.id, link_request("Blocked"))
        .await
        .is_err());

    app.upgrade(user.id).await;

    let sixth = app
        .links()
        .create_link(user.id, link_request("Sixth"))
        .await
        .unwrap();
    assert_eq!(sixth.order_index, 5);

    let limits = app.links().check_limits(user.id).await.unwrap();
    assert!(limits.can_create_link);
    assert!(limits.is_premium);
    assert_eq!(limits.max_links, LinkCapacity::Unlimited);
    assert_eq!(limits.link_count, 6);
}

#[tokio::test]
#[ignore] // Requires database
async fn test_cancelled_subscription_restores_limit() {
    let app = setup_test_app().await;
    let user = app.create_premium_user().await;

    for i in 0..6 {
        app.create_link(user.id, &format!("Link{}", i)).await;
    }

    let updated = app
        .subscriptions()
        .update_subscription_status(UpdateSubscriptionStatusRequest {
            user_id: user.id,
            status: SubscriptionStatus::Cancelled,
        })
        .await
        .unwrap()
        .expect("subscription exists");
    assert_eq!(updated.status, SubscriptionStatus::Cancelled);

    let limits = app.links().check_limits(user.id).await.unwrap();
    assert!(!limits.is_premium);
    assert!(!limits.can_create_link);
    assert_eq!(limits.link_count, 6);
}

#[tokio::test]
#[ignore] // Requires database
async fn test_inactive_subscription_keeps_existing_premium() {
    let app = setup_test_app().await;
    let user = app.create_premium_user().await;
    let premium = app.reload_user(&user).await;
    let linked = premium.subscription_id;
    assert!(premium.is_premium);

    for status in [SubscriptionStatus::Inactive, SubscriptionStatus::PastDue] {
        let subscription = app
            .subscriptions()
            .create_subscription(CreateSubscriptionRequest {
                user_id: user.id,
                provider_subscription_id: None,
                status,
            })
            .await
            .unwrap();
        assert_eq!(subscription.status, status);
    }

    let after = app.reload_user(&user).await;
    assert!(after.is_premium);
    assert_eq!(after.subscription_id, linked);
    assert_eq!(after.subscription_status, Some(SubscriptionStatus::Active));
    assert!(app.links().check_limits(user.id).await.unwrap().is_premium);
}

#[tokio::test]
#[ignore] // Requires database
async fn test_inactive_subscription_does_not_grant_premium() {
    let app = setup_test_app().await;
    let user = app.create_user().await;

    app.subscriptions()
        .create_subscription(CreateSubscriptionRequest {
            user_id: user.id,
            provider_subscription_id: None,
            status: SubscriptionStatus::Inactive,
        })
        .await
        .unwrap();

    let after = app.reload_user(&user).await;
    assert!(!after.is_premium);
    assert_eq!(after.subscription_id, None);

    // A later activation of the newest subscription grants premium
    let activated = app
        .subscriptions()
        .update_subscription_status(UpdateSubscriptionStatusRequest {
            user_id: user.id,
            status: SubscriptionStatus::Active,
        })
        .await
        .unwrap()
        .expect("subscription exists");
    let after = app.reload_user(&user).await;
    assert!(after.is_premium);
    assert_eq!(after.subscription_id, Some(activated.id));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore] // Requires database
async fn test_concurrent_deletes_and_creates_stay_dense() {
    let app = setup_test_app().await;
    let user = app.create_premium_user().await;

    let mut ids = Vec::new();
    for i in 0..12 {
        ids.push(app.create_link(user.id, &format!("Link{}", i)).await.id);
    }

    let mut tasks = JoinSet::new();
    for link_id in [ids[0], ids[3], ids[6], ids[11]] {
        let links = LinkService::new(app.pool());
        let user_id = user.id;
        tasks.spawn(async move { links.delete_link(link_id, user_id).await.map(|_| ()) });
    }
    for (i, order_index) in [Some(0), Some(4), None].into_iter().enumerate() {
        let links = LinkService::new(app.pool());
        let user_id = user.id;
        tasks.spawn(async move {
            let request = CreateLinkRequest {
                order_index,
                ..link_request(&format!("Concurrent{}", i))
            };
            links.create_link(user_id, request).await.map(|_| ())
        });
    }
    while let Some(result) = tasks.join_next().await {
        result.expect("task panicked").expect("mutation failed");
    }

    let links = app.links().list_links(user.id).await.unwrap();
    assert_eq!(links.len(), 11);
    assert_dense(&links);
}

#[tokio::test]
#[ignore] // Requires database
async fn test_reorder_round_trip() {
    let app = setup_test_app().await;
    let user = app.create_user().await;

    let originals = vec![
        app.create_link(user.id, "A").await,
        app.create_link(user.id, "B").await,
        app.create_link(user.id, "C").await,
    ];

    let reversed: Vec<LinkOrder> = originals
        .iter()
        .rev()
        .zip(0..)
        .map(|(link, order_index)| LinkOrder {
            id: link.id,
            order_index,
        })
        .collect();
    let links = app.links().reorder_links(user.id, reversed).await.unwrap();
    assert_dense(&links);
    assert_eq!(links[0].id, originals[2].id);
    assert_eq!(links[2].id, originals[0].id);

    let restore: Vec<LinkOrder> = originals
        .iter()
        .map(|link| LinkOrder {
            id: link.id,
            order_index: link.order_index,
        })
        .collect();
    let links = app.links().reorder_links(user.id, restore).await.unwrap();
    let ids: Vec<Uuid> = links.iter().map(|l| l.id).collect();
    let original_ids: Vec<Uuid> = originals.iter().map(|l| l.id).collect();
    assert_eq!(ids, original_ids);

    // Empty batch is a no-op
    let links = app.links().reorder_links(user.id, Vec::new()).await.unwrap();
    assert_eq!(links.len(), 3);
}

#[tokio::test]
#[ignore] // Requires database
async fn test_invalid_reorder_is_rejected_whole() {
    let app = setup_test_app().await;
    let owner = app.create_user().await;
    let other = app.create_user().await;

    let a = app.create_link(owner.id, "A").await;
    let b = app.create_link(owner.id, "B").await;
    let foreign = app.create_link(other.id, "Foreign").await;

    let err = app
        .links()
        .reorder_links(
            owner.id,
            vec![
                LinkOrder {
                    id: a.id,
                    order_index: 1,
                },
                LinkOrder {
                    id: foreign.id,
                    order_index: 0,
                },
            ],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidOwnership(ref ids) if ids == &vec![foreign.id]));

    let err = app
        .links()
        .reorder_links(
            owner.id,
            vec![LinkOrder {
                id: a.id,
                order_index: 1,
            }],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));

    let links = app.links().list_links(owner.id).await.unwrap();
    assert_eq!(links[0].id, a.id);
    assert_eq!(links[1].id, b.id);

    let foreign_links = app.links().list_links(other.id).await.unwrap();
    assert_eq!(foreign_links[0].order_index, 0);
}

#[tokio::test]
#[ignore] // Requires database
async fn test_other_users_cannot_mutate_links() {
    let app = setup_test_app().await;
    let owner = app.create_user().await;
    let intruder = app.create_user().await;

    let link = app.create_link(owner.id, "Mine").await;

    let err = app
        .links()
        .update_link(
            link.id,
            intruder.id,
            UpdateLinkRequest {
                title: Some("Hijacked".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Unauthorized));

    let err = app
        .links()
        .delete_link(link.id, intruder.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Unauthorized));

    let links = app.links().list_links(owner.id).await.unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].title, "Mine");

    let err = app
        .links()
        .delete_link(Uuid::new_v4(), owner.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound));
}
