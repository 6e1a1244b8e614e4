use std::sync::Arc;

use chrono::{TimeZone, Utc};
use rideshare::controllers::{Caller, ControllerError, ReviewController};
use rideshare::models::Review;
use rideshare::requests::ReviewCreate;
use rideshare_core::config::AppConfig;
use rideshare_orm::{ListParams, MemoryStore, Store};
use rideshare_validation::codes;
use serde_json::json;

fn review(reviewer: i64, target: i64, rating: i64, comment: &str, day: u32) -> Review {
    let at = Utc.with_ymd_and_hms(2024, 2, day, 12, 0, 0).unwrap();
    Review {
        id: None,
        reviewer_id: reviewer,
        target_id: target,
        rating,
        comment: Some(comment.to_string()),
        created_at: Some(at),
        updated_at: Some(at),
        reviewer: None,
        target: None,
    }
}

fn controller() -> (ReviewController<MemoryStore<Review>>, Arc<MemoryStore<Review>>) {
    let store = Arc::new(MemoryStore::with_rows(vec![
        review(1, 10, 5, "great driver", 3),
        review(2, 10, 3, "late pickup", 1),
        review(3, 10, 4, "smooth ride", 7),
        review(1, 11, 2, "rude", 2),
    ]));
    let controller = ReviewController::new(store.clone(), Arc::new(AppConfig::testing()));
    (controller, store)
}

#[tokio::test]
async fn test_list_is_scoped_to_target_with_stats() {
    let (controller, _) = controller();

    let page = controller.list(10, &ListParams::new().limit(2)).await.unwrap();

    assert_eq!(page.total, 3);
    assert_eq!(page.len(), 2);
    assert!(page.data.iter().all(|review| review.target_id == 10));
    // newest first
    assert_eq!(page.data[0].comment.as_deref(), Some("smooth ride"));
    assert_eq!(page.extra["averageRating"], json!(4.0));
    assert_eq!(page.extra["totalReviews"], json!(3));
    assert_eq!(page.extra["startDate"], json!("2024-02-01T12:00:00Z"));
}

#[tokio::test]
async fn test_list_search_keeps_target_scope() {
    let (controller, _) = controller();

    let page = controller.list(10, &ListParams::new().search("r")).await.unwrap();
    assert_eq!(page.total, 2);

    let page = controller.list(11, &ListParams::new().search("great")).await.unwrap();
    assert_eq!(page.total, 0);
    assert_eq!(page.extra["totalReviews"], json!(1));
}

#[tokio::test]
async fn test_stats_for_unreviewed_user() {
    let (controller, _) = controller();

    let page = controller.list(99, &ListParams::new()).await.unwrap();
    assert!(page.is_empty());
    assert_eq!(page.extra["averageRating"], json!(null));
    assert_eq!(page.extra["totalReviews"], json!(0));
}

#[tokio::test]
async fn test_create() {
    let (controller, store) = controller();
    let body = ReviewCreate {
        target_id: 11,
        rating: 4,
        comment: None,
    };

    let created = controller.create(&Caller::user(7), body).await.unwrap();
    assert_eq!(created.reviewer_id, 7);
    assert_eq!(created.target_id, 11);
    assert_eq!(created.comment, None);
    assert_eq!(store.len().await, 5);

    let body = ReviewCreate {
        target_id: 11,
        rating: 9,
        comment: None,
    };
    let err = controller.create(&Caller::user(7), body).await.unwrap_err();
    assert_eq!(err.validation().unwrap().field, "rating");
}

#[tokio::test]
async fn test_update_own_review() {
    let (controller, store) = controller();

    let updated = controller
        .update(&Caller::user(2), 2, &json!({"rating": "4", "comment": null}))
        .await
        .unwrap();
    assert_eq!(updated.rating, 4);
    assert_eq!(updated.comment, None);
    assert_eq!(store.find(2).await.unwrap().unwrap().rating, 4);
}

#[tokio::test]
async fn test_update_validates_rating() {
    let (controller, store) = controller();

    let err = controller
        .update(&Caller::user(2), 2, &json!({"rating": 0}))
        .await
        .unwrap_err();
    assert_eq!(err.validation().unwrap().field, "rating");
    assert_eq!(store.find(2).await.unwrap().unwrap().rating, 3);

    let err = controller
        .update(&Caller::user(2), 2, &json!({"target_id": 11}))
        .await
        .unwrap_err();
    assert_eq!(err.validation().unwrap().code, codes::READ_ONLY);
}

#[tokio::test]
async fn test_update_other_reviewers_review_is_not_found() {
    let (controller, _) = controller();

    let err = controller
        .update(&Caller::user(3), 1, &json!({"rating": 1}))
        .await
        .unwrap_err();
    assert!(matches!(err, ControllerError::NotFound(_)));
}

#[tokio::test]
async fn test_delete_checks_target() {
    let (controller, store) = controller();

    let err = controller.delete(&Caller::user(1), 1, 11).await.unwrap_err();
    assert!(matches!(err, ControllerError::NotFound(_)));

    controller.delete(&Caller::user(1), 1, 10).await.unwrap();
    assert!(store.find(1).await.unwrap().is_none());
}
