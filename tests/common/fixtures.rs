//! Test fixtures for creating comments
#![allow(dead_code)]

use chrono::{DateTime, Utc};
use reviewqeem::comment::{Comment, CommentSource, ModerationPolicy, NewComment};
use reviewqeem::intake::{self, Intake, Submission};
use reviewqeem::middleware::AdminIdentity;
use reviewqeem::store::{CommentStore, MemoryStore};
use std::sync::Arc;

pub const TEST_ORIGIN: &str = "198.51.100.10";

/// Fresh in-memory store behind the trait object the web layer uses.
pub fn memory_store() -> Arc<dyn CommentStore> {
    Arc::new(MemoryStore::new())
}

pub fn test_admin() -> AdminIdentity {
    AdminIdentity {
        name: "test_admin".to_string(),
    }
}

/// A valid submission for `review_id` with the given content.
pub fn submission(review_id: &str, author: &str, content: &str) -> Submission {
    Submission {
        review_id: Some(review_id.to_string()),
        author: Some(author.to_string()),
        content: Some(content.to_string()),
        ..Default::default()
    }
}

/// Submit through the intake filter and return the stored comment.
pub async fn submit_comment(
    store: &dyn CommentStore,
    policy: &ModerationPolicy,
    review_id: &str,
    author: &str,
    content: &str,
    origin: &str,
) -> Comment {
    match intake::submit(store, policy, submission(review_id, author, content), origin)
        .await
        .expect("Submission should be accepted")
    {
        Intake::Accepted(comment) => comment,
        Intake::Trapped => panic!("Submission unexpectedly trapped"),
    }
}

/// A sanitized comment from `origin`, created now.
pub fn new_comment(review_id: &str, content: &str, origin: &str) -> NewComment {
    NewComment {
        review_id: review_id.to_string(),
        author: "seeded".to_string(),
        email: None,
        content: content.to_string(),
        source: CommentSource::Website,
        user_ip: origin.to_string(),
        created_at: Utc::now(),
    }
}

/// Insert directly into the store with an explicit creation time.
pub async fn seed_comment(
    store: &dyn CommentStore,
    review_id: &str,
    content: &str,
    origin: &str,
    created_at: DateTime<Utc>,
) -> Comment {
    store
        .insert(NewComment {
            created_at,
            ..new_comment(review_id, content, origin)
        })
        .await
        .expect("Failed to seed comment")
}
