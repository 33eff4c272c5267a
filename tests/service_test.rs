use std::sync::Arc;

use follow_api::entity::Frequency;
use follow_api::entity::SubscriberEntry;
use follow_api::service::error::ServiceError;
use follow_api::service::session_service::SessionService;
use follow_api::service::subscription_service::SubscriptionService;
use follow_api::upstream::UserData;
use follow_api::upstream::error::UpstreamError;

mod common;

use common::MockSessionApi;
use common::items;

fn ids(taxonomies: &[follow_api::entity::Taxonomy]) -> Vec<&str> {
    taxonomies.iter().map(|t| t.id.as_str()).collect()
}

#[tokio::test]
async fn test_follow_then_list() {
    let (db, db_path) = common::setup_db().await;
    let service = SubscriptionService::new(db.clone());

    let followed = service
        .follow(
            "user-1",
            &items(&[
                "daily,Author Name 1,author-id-1",
                "immediate,Author Name 2,author-id-2",
                "weekly,Author Name 3,author-id-3",
            ]),
        )
        .await
        .unwrap();

    assert_eq!(ids(&followed), vec!["author-id-1", "author-id-2", "author-id-3"]);
    assert_eq!(followed[0].frequency, Frequency::Daily);
    assert_eq!(followed[1].frequency, Frequency::Immediate);
    assert_eq!(followed[2].frequency, Frequency::Daily);
    assert!(followed.iter().all(|t| t.r#type == "authors"));

    let listed = service.list_subscriptions("user-1").await.unwrap();
    assert_eq!(listed, followed);

    common::teardown_db(db_path).await;
}

#[tokio::test]
async fn test_batch_listing_order_is_stable() {
    let (db, db_path) = common::setup_db().await;
    let service = SubscriptionService::new(db.clone());

    // Writes of one batch complete in any order; the listing must not.
    for _ in 0..5 {
        let followed = service
            .follow(
                "user-1",
                &items(&["daily,E,e", "daily,C,c", "immediate,A,a", "daily,D,d", "daily,B,b"]),
            )
            .await
            .unwrap();
        assert_eq!(ids(&followed), vec!["a", "b", "c", "d", "e"]);
        service.unfollow_all("user-1").await.unwrap();
    }

    // A later batch lists after an earlier one.
    service.follow("user-1", &items(&["daily,Z,z"])).await.unwrap();
    let listed = service
        .follow("user-1", &items(&["daily,Y,y", "daily,X,x"]))
        .await
        .unwrap();
    assert_eq!(ids(&listed), vec!["z", "x", "y"]);

    common::teardown_db(db_path).await;
}

#[tokio::test]
async fn test_follow_is_idempotent() {
    let (db, db_path) = common::setup_db().await;
    let service = SubscriptionService::new(db.clone());
    let batch = items(&["daily,A,a", "immediate,B,b"]);

    let first = service.follow("user-1", &batch).await.unwrap();
    let second = service.follow("user-1", &batch).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(db.subscription.select_all_by_user_id("user-1").await.unwrap().len(), 2);

    common::teardown_db(db_path).await;
}

#[tokio::test]
async fn test_refollow_updates_frequency_and_keeps_added_at() {
    let (db, db_path) = common::setup_db().await;
    let service = SubscriptionService::new(db.clone());

    service.follow("user-1", &items(&["daily,A,a"])).await.unwrap();
    let before = db.subscription.select("user-1", "a").await.unwrap().unwrap();

    let after_follow = service
        .follow("user-1", &items(&["immediate,A renamed,a"]))
        .await
        .unwrap();

    assert_eq!(after_follow.len(), 1);
    assert_eq!(after_follow[0].frequency, Frequency::Immediate);
    assert_eq!(after_follow[0].name, "A renamed");

    let after = db.subscription.select("user-1", "a").await.unwrap().unwrap();
    assert_eq!(after.id, before.id);
    assert_eq!(
        after.added_at.timestamp_millis(),
        before.added_at.timestamp_millis()
    );

    common::teardown_db(db_path).await;
}

#[tokio::test]
async fn test_unfollow_removes_only_targeted_pairs() {
    let (db, db_path) = common::setup_db().await;
    let service = SubscriptionService::new(db.clone());

    service
        .follow("user-1", &items(&["daily,A,a", "daily,B,b", "daily,C,c"]))
        .await
        .unwrap();
    service.follow("user-2", &items(&["daily,A,a"])).await.unwrap();

    // `missing` was never followed and is skipped.
    let remaining = service
        .unfollow("user-1", &items(&["daily,A,a", "daily,Missing,missing"]))
        .await
        .unwrap();
    assert_eq!(ids(&remaining), vec!["b", "c"]);

    // Frequency and name of the descriptor do not matter for removal.
    let remaining = service
        .unfollow("user-1", &items(&["immediate,Other name,b"]))
        .await
        .unwrap();
    assert_eq!(ids(&remaining), vec!["c"]);

    let other = service.list_subscriptions("user-2").await.unwrap();
    assert_eq!(ids(&other), vec!["a"]);

    common::teardown_db(db_path).await;
}

#[tokio::test]
async fn test_unfollow_all() {
    let (db, db_path) = common::setup_db().await;
    let service = SubscriptionService::new(db.clone());

    service
        .follow("user-1", &items(&["daily,A,a", "immediate,B,b"]))
        .await
        .unwrap();
    service.follow("user-2", &items(&["daily,A,a"])).await.unwrap();

    let remaining = service.unfollow_all("user-1").await.unwrap();
    assert!(remaining.is_empty());

    // Unfollowing everything twice is harmless.
    assert!(service.unfollow_all("user-1").await.unwrap().is_empty());
    assert_eq!(service.list_subscriptions("user-2").await.unwrap().len(), 1);

    common::teardown_db(db_path).await;
}

#[tokio::test]
async fn test_list_subscribers() {
    let (db, db_path) = common::setup_db().await;
    let service = SubscriptionService::new(db.clone());

    service.follow("user-1", &items(&["daily,A,a"])).await.unwrap();
    service.follow("user-2", &items(&["immediate,A,a", "daily,B,b"])).await.unwrap();

    let subscribers = service.list_subscribers("a").await.unwrap();
    assert_eq!(
        subscribers,
        vec![
            SubscriberEntry {
                user_id: "user-1".to_string()
            },
            SubscriberEntry {
                user_id: "user-2".to_string()
            },
        ]
    );

    service.unfollow("user-1", &items(&["daily,A,a"])).await.unwrap();
    assert_eq!(
        service.list_subscribers("a").await.unwrap(),
        vec![SubscriberEntry {
            user_id: "user-2".to_string()
        }]
    );
    assert!(service.list_subscribers("unknown").await.unwrap().is_empty());

    common::teardown_db(db_path).await;
}

#[tokio::test]
async fn test_concurrent_follows_of_different_users() {
    let (db, db_path) = common::setup_db().await;
    let service = Arc::new(SubscriptionService::new(db.clone()));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let service = service.clone();
            tokio::spawn(async move {
                let user = format!("user-{i}");
                service
                    .follow(&user, &items(&["daily,A,a", "immediate,B,b"]))
                    .await
            })
        })
        .collect();

    for handle in handles {
        let followed = handle.await.unwrap().unwrap();
        assert_eq!(ids(&followed), vec!["a", "b"]);
    }
    assert_eq!(service.list_subscribers("a").await.unwrap().len(), 8);

    common::teardown_db(db_path).await;
}

#[tokio::test]
async fn test_storage_failure_is_reported() {
    let (db, db_path) = common::setup_db().await;
    let service = SubscriptionService::new(db.clone());
    db.close().await;

    let result = service.follow("user-1", &items(&["daily,A,a"])).await;
    assert!(matches!(result, Err(ServiceError::DatabaseError(_))));

    let result = service.list_subscribers("a").await;
    assert!(matches!(result, Err(ServiceError::DatabaseError(_))));

    common::teardown_db(db_path).await;
}

#[tokio::test]
async fn test_resolve_user_id() {
    let mut api = MockSessionApi::new();
    api.expect_get_user_data()
        .withf(|session_id| session_id == "valid-session")
        .times(1)
        .returning(|_| {
            Ok(UserData {
                uuid: "user-1".to_string(),
            })
        });
    let service = SessionService::new(Arc::new(api));

    assert_eq!(service.resolve_user_id("valid-session").await.unwrap(), "user-1");
}

#[tokio::test]
async fn test_resolve_user_id_failures() {
    let mut api = MockSessionApi::new();
    api.expect_get_user_data()
        .withf(|session_id| session_id == "anonymous")
        .returning(|_| Ok(UserData { uuid: String::new() }));
    api.expect_get_user_data()
        .withf(|session_id| session_id == "expired")
        .returning(|_| Err(UpstreamError::UserNotFound));
    let service = SessionService::new(Arc::new(api));

    assert!(matches!(
        service.resolve_user_id("anonymous").await,
        Err(ServiceError::UpstreamError(UpstreamError::UserNotFound))
    ));
    assert!(matches!(
        service.resolve_user_id("expired").await,
        Err(ServiceError::UpstreamError(UpstreamError::UserNotFound))
    ));
}
