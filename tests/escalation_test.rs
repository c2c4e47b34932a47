//! Integration tests for likes, reports and threshold escalation

mod common;

use common::fixtures::*;
use reviewqeem::comment::{CommentStatus, ModerationPolicy};
use reviewqeem::engagement::{like, report};
use reviewqeem::error::ModerationError;
use reviewqeem::moderation;
use reviewqeem::store::CommentStore;
use std::sync::Arc;
use uuid::Uuid;

#[actix_rt::test]
async fn test_like_increments_without_status_change() {
    let store = memory_store();
    let policy = ModerationPolicy::default();
    let comment =
        submit_comment(store.as_ref(), &policy, "review-1", "Ann", "Fun", TEST_ORIGIN).await;

    for expected in 1..=3 {
        let liked = like(store.as_ref(), comment.id).await.expect("Like failed");
        assert_eq!(liked.likes, expected);
        assert_eq!(liked.status, CommentStatus::Pending);
    }
}

#[actix_rt::test]
async fn test_report_escalation_thresholds() {
    let store = memory_store();
    let policy = ModerationPolicy::default();
    let comment =
        submit_comment(store.as_ref(), &policy, "review-1", "Ann", "Rude", TEST_ORIGIN).await;
    moderation::approve(store.as_ref(), &test_admin(), comment.id)
        .await
        .expect("Approve failed");

    for n in 1..policy.report_threshold {
        let reported = report(store.as_ref(), &policy, comment.id).await.unwrap();
        assert_eq!(reported.reports, n);
        assert_eq!(reported.status, CommentStatus::Approved);
    }

    let reported = report(store.as_ref(), &policy, comment.id).await.unwrap();
    assert_eq!(reported.reports, 5);
    assert_eq!(reported.status, CommentStatus::Reported);

    for _ in 6..policy.reject_threshold {
        let reported = report(store.as_ref(), &policy, comment.id).await.unwrap();
        assert_eq!(reported.status, CommentStatus::Reported);
    }

    let rejected = report(store.as_ref(), &policy, comment.id).await.unwrap();
    assert_eq!(rejected.reports, 10);
    assert_eq!(rejected.status, CommentStatus::Rejected);

    // Further reports still count but never revive the comment
    let rejected = report(store.as_ref(), &policy, comment.id).await.unwrap();
    assert_eq!(rejected.reports, 11);
    assert_eq!(rejected.status, CommentStatus::Rejected);
}

#[actix_rt::test]
async fn test_pending_comment_escalates_to_reported() {
    let store = memory_store();
    let policy = ModerationPolicy::default();
    let comment =
        submit_comment(store.as_ref(), &policy, "review-1", "Ann", "Spam?", TEST_ORIGIN).await;

    let mut last = comment.clone();
    for _ in 0..policy.report_threshold {
        last = report(store.as_ref(), &policy, comment.id).await.unwrap();
    }
    assert_eq!(last.reports, 5);
    assert_eq!(last.status, CommentStatus::Reported);
}

#[actix_rt::test]
async fn test_rejected_comment_is_not_reopened_by_reports() {
    let store = memory_store();
    let policy = ModerationPolicy::default();
    let comment =
        submit_comment(store.as_ref(), &policy, "review-1", "Ann", "Meh", TEST_ORIGIN).await;
    moderation::reject(store.as_ref(), &test_admin(), comment.id)
        .await
        .unwrap();

    for _ in 0..policy.report_threshold {
        let reported = report(store.as_ref(), &policy, comment.id).await.unwrap();
        assert_eq!(reported.status, CommentStatus::Rejected);
    }
}

#[actix_rt::test]
async fn test_approve_forgives_reports() {
    let store = memory_store();
    let policy = ModerationPolicy::default();
    let comment =
        submit_comment(store.as_ref(), &policy, "review-1", "Ann", "Edgy", TEST_ORIGIN).await;

    for _ in 0..policy.report_threshold {
        report(store.as_ref(), &policy, comment.id).await.unwrap();
    }

    let approved = moderation::approve(store.as_ref(), &test_admin(), comment.id)
        .await
        .unwrap();
    assert_eq!(approved.status, CommentStatus::Approved);
    assert_eq!(approved.reports, 0);

    // Escalation starts over from zero
    let reported = report(store.as_ref(), &policy, comment.id).await.unwrap();
    assert_eq!(reported.reports, 1);
    assert_eq!(reported.status, CommentStatus::Approved);
}

#[actix_rt::test]
async fn test_missing_comment_is_not_found() {
    let store = memory_store();
    let policy = ModerationPolicy::default();
    let missing = Uuid::new_v4();

    assert!(matches!(
        like(store.as_ref(), missing).await,
        Err(ModerationError::NotFound)
    ));
    assert!(matches!(
        report(store.as_ref(), &policy, missing).await,
        Err(ModerationError::NotFound)
    ));
    assert!(matches!(
        moderation::approve(store.as_ref(), &test_admin(), missing).await,
        Err(ModerationError::NotFound)
    ));
    assert!(matches!(
        moderation::delete(store.as_ref(), &test_admin(), missing).await,
        Err(ModerationError::NotFound)
    ));
}

#[actix_rt::test]
async fn test_edit_keeps_status_and_counters() {
    let store = memory_store();
    let policy = ModerationPolicy::default();
    let comment =
        submit_comment(store.as_ref(), &policy, "review-1", "Ann", "Typo", TEST_ORIGIN).await;
    moderation::approve(store.as_ref(), &test_admin(), comment.id)
        .await
        .unwrap();
    like(store.as_ref(), comment.id).await.unwrap();

    let edited = moderation::edit(
        store.as_ref(),
        &policy,
        &test_admin(),
        comment.id,
        moderation::CommentEdit {
            author: None,
            content: Some("Fixed <i>typo</i>".to_string()),
        },
    )
    .await
    .unwrap();

    assert_eq!(edited.content, "Fixed typo");
    assert_eq!(edited.author, "Ann");
    assert_eq!(edited.status, CommentStatus::Approved);
    assert_eq!(edited.likes, 1);

    let empty = moderation::edit(
        store.as_ref(),
        &policy,
        &test_admin(),
        comment.id,
        moderation::CommentEdit {
            author: None,
            content: Some("<b></b>".to_string()),
        },
    )
    .await;
    assert!(matches!(empty, Err(ModerationError::Validation(_))));
}

#[actix_rt::test]
async fn test_concurrent_likes_are_not_lost() {
    let store = memory_store();
    let policy = ModerationPolicy::default();
    let comment =
        submit_comment(store.as_ref(), &policy, "review-1", "Ann", "Hot take", TEST_ORIGIN).await;

    let mut handles = Vec::new();
    for _ in 0..50 {
        let store: Arc<dyn CommentStore> = store.clone();
        let id = comment.id;
        handles.push(actix_rt::spawn(async move {
            like(store.as_ref(), id).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let stored = store.find_by_id(comment.id).await.unwrap().unwrap();
    assert_eq!(stored.likes, 50);
}
