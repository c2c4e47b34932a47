//! Public like and report counters.

use crate::comment::{Comment, CommentStatus, ModerationPolicy};
use crate::error::ModerationError;
use crate::store::CommentStore;
use uuid::Uuid;

/// Add one like. Never touches the moderation status.
pub async fn like(store: &dyn CommentStore, id: Uuid) -> Result<Comment, ModerationError> {
    store
        .increment_likes(id)
        .await?
        .ok_or(ModerationError::NotFound)
}

/// Add one report and let the store escalate the status in the same write.
pub async fn report(
    store: &dyn CommentStore,
    policy: &ModerationPolicy,
    id: Uuid,
) -> Result<Comment, ModerationError> {
    let comment = store
        .increment_reports(id, policy)
        .await?
        .ok_or(ModerationError::NotFound)?;

    let crossed = (comment.reports == policy.reject_threshold
        && comment.status == CommentStatus::Rejected)
        || (comment.reports == policy.report_threshold
            && comment.status == CommentStatus::Reported);
    if crossed {
        log::warn!(
            "Comment {} is now {} after {} reports",
            comment.id,
            comment.status,
            comment.reports
        );
    }

    Ok(comment)
}
