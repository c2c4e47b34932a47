//! Integration tests for the Postgres comment store
//!
//! These run against TEST_DATABASE_URL and are skipped when it is unset.

mod common;
use serial_test::serial;

use chrono::{Duration, Utc};
use common::{database::*, fixtures::*};
use reviewqeem::comment::{CommentStatus, ModerationPolicy};
use reviewqeem::sanitize::MAX_REVIEW_ID_LENGTH;
use reviewqeem::store::{CommentPatch, CommentQuery, CommentStore, DatabaseStore, SortOrder};
use std::sync::Arc;
use uuid::Uuid;

/// Connected store over an empty table, or `None` to skip.
async fn fresh_store() -> Option<Arc<DatabaseStore>> {
    let db = match setup_test_database().await {
        Some(db) => db.expect("Failed to connect to test database"),
        None => {
            eprintln!("TEST_DATABASE_URL not set, skipping database store test");
            return None;
        }
    };
    cleanup_test_data(&db).await.expect("Failed to cleanup");
    Some(Arc::new(DatabaseStore::new(db)))
}

#[actix_rt::test]
#[serial]
async fn test_insert_and_find() {
    let Some(store) = fresh_store().await else { return };

    let created = seed_comment(
        store.as_ref(),
        "db-review",
        "stored",
        TEST_ORIGIN,
        Utc::now(),
    )
    .await;
    let found = store
        .find_by_id(created.id)
        .await
        .expect("Lookup failed")
        .expect("Comment should exist");

    assert_eq!(found.id, created.id);
    assert_eq!(found.content, "stored");
    assert_eq!(found.status, CommentStatus::Pending);
    assert_eq!(found.user_ip, TEST_ORIGIN);

    assert!(store.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
}

#[actix_rt::test]
#[serial]
async fn test_duplicate_insert_respects_window() {
    let Some(store) = fresh_store().await else { return };
    let now = Utc::now();

    seed_comment(
        store.as_ref(),
        "db-review",
        "old news",
        TEST_ORIGIN,
        now - Duration::minutes(10),
    )
    .await;
    let since = now - Duration::minutes(5);

    let fresh = store
        .insert_unless_duplicate(new_comment("db-review", "old news", TEST_ORIGIN), since)
        .await
        .unwrap();
    assert!(fresh.is_some());

    let again = store
        .insert_unless_duplicate(new_comment("db-review", "old news", TEST_ORIGIN), since)
        .await
        .unwrap();
    assert!(again.is_none());
}

#[actix_rt::test]
#[serial]
async fn test_racing_duplicates_store_one() {
    let Some(store) = fresh_store().await else { return };
    let since = Utc::now() - Duration::minutes(5);

    let mut handles = Vec::new();
    for _ in 0..10 {
        let store = store.clone();
        handles.push(actix_rt::spawn(async move {
            store
                .insert_unless_duplicate(new_comment("db-review", "first!", TEST_ORIGIN), since)
                .await
                .unwrap()
                .is_some()
        }));
    }
    let mut stored = 0;
    for handle in handles {
        if handle.await.unwrap() {
            stored += 1;
        }
    }

    assert_eq!(stored, 1);
    assert_eq!(store.count(&CommentQuery::new()).await.unwrap(), 1);
}

#[actix_rt::test]
#[serial]
async fn test_longest_review_id_fits_column() {
    let Some(store) = fresh_store().await else { return };
    let review_id = "r".repeat(MAX_REVIEW_ID_LENGTH);

    let comment = seed_comment(store.as_ref(), &review_id, "edge", TEST_ORIGIN, Utc::now()).await;
    assert_eq!(comment.review_id.chars().count(), MAX_REVIEW_ID_LENGTH);
}

#[actix_rt::test]
#[serial]
async fn test_report_escalation_in_one_statement() {
    let Some(store) = fresh_store().await else { return };
    let policy = ModerationPolicy::default();
    let comment = seed_comment(store.as_ref(), "db-review", "spicy", TEST_ORIGIN, Utc::now()).await;

    let mut last = None;
    for _ in 0..policy.report_threshold {
        last = store.increment_reports(comment.id, &policy).await.unwrap();
    }
    let reported = last.clone().expect("Comment should exist");
    assert_eq!(reported.reports, 5);
    assert_eq!(reported.status, CommentStatus::Reported);

    for _ in policy.report_threshold..policy.reject_threshold {
        last = store.increment_reports(comment.id, &policy).await.unwrap();
    }
    let rejected = last.expect("Comment should exist");
    assert_eq!(rejected.reports, 10);
    assert_eq!(rejected.status, CommentStatus::Rejected);

    let approved = store
        .update(
            comment.id,
            CommentPatch {
                status: Some(CommentStatus::Approved),
                reset_reports: true,
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(approved.reports, 0);
    assert_eq!(approved.status, CommentStatus::Approved);
}

#[actix_rt::test]
#[serial]
async fn test_concurrent_likes_are_not_lost() {
    let Some(store) = fresh_store().await else { return };
    let comment = seed_comment(
        store.as_ref(),
        "db-review",
        "popular",
        TEST_ORIGIN,
        Utc::now(),
    )
    .await;

    let mut handles = Vec::new();
    for _ in 0..20 {
        let store = store.clone();
        let id = comment.id;
        handles.push(actix_rt::spawn(async move {
            store.increment_likes(id).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let stored = store.find_by_id(comment.id).await.unwrap().unwrap();
    assert_eq!(stored.likes, 20);
}

#[actix_rt::test]
#[serial]
async fn test_list_filters_and_counts() {
    let Some(store) = fresh_store().await else { return };
    let policy = ModerationPolicy::default();
    let now = Utc::now();

    let a = seed_comment(
        store.as_ref(),
        "db-review",
        "a",
        "10.0.0.1",
        now - Duration::minutes(2),
    )
    .await;
    let b = seed_comment(
        store.as_ref(),
        "db-review",
        "b",
        "10.0.0.2",
        now - Duration::minutes(1),
    )
    .await;
    seed_comment(store.as_ref(), "db-other", "c", "10.0.0.3", now).await;

    store.toggle_featured(a.id).await.unwrap();
    for _ in 0..policy.attention_threshold {
        store.increment_reports(b.id, &policy).await.unwrap();
    }

    let newest = store
        .list(&CommentQuery::new().review("db-review"))
        .await
        .unwrap();
    let ids: Vec<_> = newest.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![b.id, a.id]);

    let attention = store
        .list(
            &CommentQuery::new()
                .needs_attention(policy.attention_threshold)
                .order(SortOrder::MostReported),
        )
        .await
        .unwrap();
    assert_eq!(attention.len(), 1);
    assert_eq!(attention[0].id, b.id);

    let featured = store
        .count(&CommentQuery::new().review("db-review").featured(true))
        .await
        .unwrap();
    assert_eq!(featured, 1);

    let by_author = store
        .list(&CommentQuery::new().author_contains("SEED"))
        .await
        .unwrap();
    assert_eq!(by_author.len(), 3);

    assert!(store.delete(a.id).await.unwrap());
    assert!(!store.delete(a.id).await.unwrap());
    assert_eq!(store.count(&CommentQuery::new()).await.unwrap(), 2);
}
