//! Admin moderation actions
//!
//! Callers are expected to have passed the admin gate. Nothing here checks
//! identity beyond recording who acted in the log.

use crate::comment::{Comment, CommentStatus, ModerationPolicy};
use crate::error::ModerationError;
use crate::middleware::AdminIdentity;
use crate::sanitize::{sanitize_author, sanitize_content};
use crate::store::{CommentPatch, CommentStore};
use serde::Deserialize;
use uuid::Uuid;

/// Fields an admin may rewrite on an existing comment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentEdit {
    pub author: Option<String>,
    pub content: Option<String>,
}

/// Approve a comment. Prior reports are forgiven.
pub async fn approve(
    store: &dyn CommentStore,
    admin: &AdminIdentity,
    id: Uuid,
) -> Result<Comment, ModerationError> {
    let comment = store
        .update(
            id,
            CommentPatch {
                status: Some(CommentStatus::Approved),
                reset_reports: true,
                ..Default::default()
            },
        )
        .await?
        .ok_or(ModerationError::NotFound)?;

    log::info!("Comment {} approved by {}", id, admin.name);
    Ok(comment)
}

pub async fn reject(
    store: &dyn CommentStore,
    admin: &AdminIdentity,
    id: Uuid,
) -> Result<Comment, ModerationError> {
    let comment = store
        .update(
            id,
            CommentPatch {
                status: Some(CommentStatus::Rejected),
                ..Default::default()
            },
        )
        .await?
        .ok_or(ModerationError::NotFound)?;

    log::info!("Comment {} rejected by {}", id, admin.name);
    Ok(comment)
}

pub async fn toggle_featured(
    store: &dyn CommentStore,
    admin: &AdminIdentity,
    id: Uuid,
) -> Result<Comment, ModerationError> {
    let comment = store
        .toggle_featured(id)
        .await?
        .ok_or(ModerationError::NotFound)?;

    log::info!(
        "Comment {} {} by {}",
        id,
        if comment.featured { "featured" } else { "unfeatured" },
        admin.name
    );
    Ok(comment)
}

/// Rewrite author and/or content, sanitized the same way as intake.
/// Status, counters and the featured flag are left alone.
pub async fn edit(
    store: &dyn CommentStore,
    policy: &ModerationPolicy,
    admin: &AdminIdentity,
    id: Uuid,
    edit: CommentEdit,
) -> Result<Comment, ModerationError> {
    let content = match edit.content {
        Some(raw) => {
            let content = sanitize_content(&raw);
            if content.is_empty() {
                return Err(ModerationError::Validation(
                    "Content must not be empty.".to_string(),
                ));
            }
            Some(content)
        }
        None => None,
    };
    let author = edit
        .author
        .map(|raw| sanitize_author(Some(&raw), &policy.default_author));

    let comment = store
        .update(
            id,
            CommentPatch {
                author,
                content,
                ..Default::default()
            },
        )
        .await?
        .ok_or(ModerationError::NotFound)?;

    log::info!("Comment {} edited by {}", id, admin.name);
    Ok(comment)
}

pub async fn delete(
    store: &dyn CommentStore,
    admin: &AdminIdentity,
    id: Uuid,
) -> Result<(), ModerationError> {
    if !store.delete(id).await? {
        return Err(ModerationError::NotFound);
    }

    log::info!("Comment {} deleted by {}", id, admin.name);
    Ok(())
}
