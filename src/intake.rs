//! Intake filter for public comment submissions
//!
//! Order of checks:
//! 1. Honeypot: a filled `website` field gets a success-shaped answer and
//!    nothing is stored.
//! 2. Sanitization of every free-text field.
//! 3. Validation of the required fields after sanitization.
//! 4. Duplicate suppression: same origin, same sanitized content, inside the
//!    policy window. The store checks and inserts in one atomic step.

use crate::comment::{Comment, CommentSource, ModerationPolicy, NewComment};
use crate::error::ModerationError;
use crate::sanitize::{sanitize_author, sanitize_content, sanitize_email, MAX_REVIEW_ID_LENGTH};
use crate::store::CommentStore;
use chrono::{Duration, Utc};
use serde::Deserialize;

/// Raw submission as delivered by the transport layer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub review_id: Option<String>,
    pub author: Option<String>,
    pub content: Option<String>,
    pub email: Option<String>,
    /// Honeypot. Hidden from humans, so only bots fill it in.
    pub website: Option<String>,
    pub source: Option<String>,
}

/// Outcome of a submission that did not fail.
#[derive(Debug)]
pub enum Intake {
    /// Stored in `pending` state
    Accepted(Comment),
    /// Honeypot tripped. Report success to the caller, store nothing.
    Trapped,
}

impl Submission {
    pub fn is_bot(&self) -> bool {
        self.website
            .as_deref()
            .map(|w| !w.trim().is_empty())
            .unwrap_or(false)
    }
}

pub async fn submit(
    store: &dyn CommentStore,
    policy: &ModerationPolicy,
    submission: Submission,
    origin: &str,
) -> Result<Intake, ModerationError> {
    if submission.is_bot() {
        log::info!("Honeypot triggered by {}, submission discarded", origin);
        return Ok(Intake::Trapped);
    }

    let review_id = submission
        .review_id
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();
    let content = sanitize_content(submission.content.as_deref().unwrap_or_default());
    let author = sanitize_author(submission.author.as_deref(), &policy.default_author);
    let email = sanitize_email(submission.email.as_deref());

    if review_id.is_empty() || content.is_empty() {
        return Err(ModerationError::Validation(
            "Review and content are required.".to_string(),
        ));
    }
    if review_id.chars().count() > MAX_REVIEW_ID_LENGTH {
        return Err(ModerationError::Validation(
            "Review id is too long.".to_string(),
        ));
    }

    let now = Utc::now();
    let since = now - Duration::seconds(policy.duplicate_window.as_secs() as i64);
    let new_comment = NewComment {
        review_id,
        author,
        email,
        content,
        source: CommentSource::parse_lenient(submission.source.as_deref()),
        user_ip: origin.to_string(),
        created_at: now,
    };

    let comment = match store.insert_unless_duplicate(new_comment, since).await? {
        Some(comment) => comment,
        None => {
            log::warn!("Duplicate comment from {} suppressed", origin);
            return Err(ModerationError::Duplicate);
        }
    };

    log::info!(
        "Comment {} submitted on review {} (pending)",
        comment.id,
        comment.review_id
    );
    Ok(Intake::Accepted(comment))
}
