//! Read paths for public display and the admin moderation views.
//!
//! Nothing in here mutates a comment.

use crate::comment::{Comment, CommentStatus, ModerationPolicy, ReviewStats};
use crate::error::ModerationError;
use crate::store::{CommentQuery, CommentStore, SortOrder};

/// Largest page the popular list will serve.
pub const MAX_POPULAR_LIMIT: u64 = 50;

/// Approved comments on a review, newest first.
pub async fn approved_for_review(
    store: &dyn CommentStore,
    review_id: &str,
) -> Result<Vec<Comment>, ModerationError> {
    let query = CommentQuery::new()
        .review(review_id)
        .status(CommentStatus::Approved)
        .order(SortOrder::NewestFirst);
    Ok(store.list(&query).await?)
}

/// Featured approved comments, most liked first, globally or for one review.
pub async fn featured(
    store: &dyn CommentStore,
    policy: &ModerationPolicy,
    review_id: Option<&str>,
) -> Result<Vec<Comment>, ModerationError> {
    let mut query = CommentQuery::new()
        .featured(true)
        .status(CommentStatus::Approved)
        .order(SortOrder::MostLiked)
        .limit(policy.featured_limit);
    if let Some(review_id) = review_id {
        query = query.review(review_id);
    }
    Ok(store.list(&query).await?)
}

/// Most liked approved comments across all reviews.
pub async fn popular(
    store: &dyn CommentStore,
    policy: &ModerationPolicy,
    limit: Option<u64>,
) -> Result<Vec<Comment>, ModerationError> {
    let limit = limit
        .unwrap_or(policy.popular_limit)
        .clamp(1, MAX_POPULAR_LIMIT);
    let query = CommentQuery::new()
        .status(CommentStatus::Approved)
        .order(SortOrder::MostLiked)
        .limit(limit);
    Ok(store.list(&query).await?)
}

pub async fn all(store: &dyn CommentStore) -> Result<Vec<Comment>, ModerationError> {
    Ok(store.list(&CommentQuery::new()).await?)
}

/// Pending comments, newest first.
pub async fn pending(store: &dyn CommentStore) -> Result<Vec<Comment>, ModerationError> {
    let query = CommentQuery::new().status(CommentStatus::Pending);
    Ok(store.list(&query).await?)
}

/// Review queue for one review: pending comments, oldest first.
pub async fn pending_for_review(
    store: &dyn CommentStore,
    review_id: &str,
) -> Result<Vec<Comment>, ModerationError> {
    let query = CommentQuery::new()
        .review(review_id)
        .status(CommentStatus::Pending)
        .order(SortOrder::OldestFirst);
    Ok(store.list(&query).await?)
}

/// Comments that need a moderator: `reported`, or at the attention threshold.
/// Deliberately looser than the `reported` status itself.
pub async fn needs_attention(
    store: &dyn CommentStore,
    policy: &ModerationPolicy,
) -> Result<Vec<Comment>, ModerationError> {
    let query = CommentQuery::new()
        .needs_attention(policy.attention_threshold)
        .order(SortOrder::MostReported);
    Ok(store.list(&query).await?)
}

/// Comments whose author contains `name`, case-insensitively.
pub async fn by_author(
    store: &dyn CommentStore,
    name: &str,
) -> Result<Vec<Comment>, ModerationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ModerationError::Validation(
            "User name is required.".to_string(),
        ));
    }
    let query = CommentQuery::new().author_contains(name);
    Ok(store.list(&query).await?)
}

pub async fn review_stats(
    store: &dyn CommentStore,
    review_id: &str,
) -> Result<ReviewStats, ModerationError> {
    let base = CommentQuery::new().review(review_id);

    Ok(ReviewStats {
        total: store.count(&base).await?,
        approved: store
            .count(&base.clone().status(CommentStatus::Approved))
            .await?,
        pending: store
            .count(&base.clone().status(CommentStatus::Pending))
            .await?,
        featured: store.count(&base.featured(true)).await?,
    })
}
