//! Comment records and the moderation state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Moderation state of a comment.
///
/// `pending` is the only initial state and nothing ever returns to it.
/// `approved` can still be escalated by reports; `rejected` absorbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    Pending,
    Approved,
    Rejected,
    Reported,
}

impl CommentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentStatus::Pending => "pending",
            CommentStatus::Approved => "approved",
            CommentStatus::Rejected => "rejected",
            CommentStatus::Reported => "reported",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(CommentStatus::Pending),
            "approved" => Some(CommentStatus::Approved),
            "rejected" => Some(CommentStatus::Rejected),
            "reported" => Some(CommentStatus::Reported),
            _ => None,
        }
    }

    /// Status after the report counter has moved to `reports`.
    ///
    /// Forced rejection wins over everything else. Escalation to `reported`
    /// only applies to comments still in normal flow.
    pub fn after_report(self, reports: i32, policy: &ModerationPolicy) -> Self {
        if reports >= policy.reject_threshold {
            CommentStatus::Rejected
        } else if reports >= policy.report_threshold
            && matches!(self, CommentStatus::Pending | CommentStatus::Approved)
        {
            CommentStatus::Reported
        } else {
            self
        }
    }
}

impl std::fmt::Display for CommentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client the comment was submitted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CommentSource {
    #[default]
    Website,
    Mobile,
    Api,
}

impl CommentSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentSource::Website => "website",
            CommentSource::Mobile => "mobile",
            CommentSource::Api => "api",
        }
    }

    /// Unknown or missing values fall back to `website`.
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("mobile") => CommentSource::Mobile,
            Some("api") => CommentSource::Api,
            _ => CommentSource::Website,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub review_id: String,
    pub author: String,
    pub email: Option<String>,
    pub content: String,
    pub status: CommentStatus,
    pub likes: i32,
    pub reports: i32,
    pub featured: bool,
    pub source: CommentSource,
    /// Origin of the submission. Used for duplicate suppression, never shown.
    #[serde(skip_serializing)]
    pub user_ip: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A sanitized comment ready to be persisted.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub review_id: String,
    pub author: String,
    pub email: Option<String>,
    pub content: String,
    pub source: CommentSource,
    pub user_ip: String,
    pub created_at: DateTime<Utc>,
}

impl NewComment {
    /// Materialize the record with the creation defaults.
    pub fn into_comment(self, id: Uuid) -> Comment {
        Comment {
            id,
            review_id: self.review_id,
            author: self.author,
            email: self.email,
            content: self.content,
            status: CommentStatus::Pending,
            likes: 0,
            reports: 0,
            featured: false,
            source: self.source,
            user_ip: self.user_ip,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// Thresholds and sizes the pipeline runs under.
#[derive(Debug, Clone)]
pub struct ModerationPolicy {
    pub report_threshold: i32,
    pub reject_threshold: i32,
    pub attention_threshold: i32,
    pub duplicate_window: Duration,
    pub featured_limit: u64,
    pub popular_limit: u64,
    pub default_author: String,
}

impl Default for ModerationPolicy {
    fn default() -> Self {
        crate::app_config::ModerationConfig::default().policy()
    }
}

/// Per-review counters for the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct ReviewStats {
    pub total: u64,
    pub approved: u64,
    pub pending: u64,
    pub featured: u64,
}
