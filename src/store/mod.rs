//! Comment store abstraction.
//!
//! Supports multiple backends:
//! - `memory`: in-process map, used by tests and single-node deployments
//! - `database`: PostgreSQL through SeaORM
//!
//! Every mutating method is a single atomic step against the backend. In
//! particular `increment_reports` applies the counter change and any
//! threshold escalation together, so no reader ever sees one without the
//! other.

pub mod database;
pub mod memory;

use crate::comment::{Comment, CommentStatus, ModerationPolicy, NewComment};
use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub use database::DatabaseStore;
pub use memory::MemoryStore;

/// Sort orders offered by list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
    /// Likes descending, then newest first
    MostLiked,
    /// Reports descending, then newest first
    MostReported,
}

/// Filter for list and count queries. Empty filter matches everything.
#[derive(Debug, Clone, Default)]
pub struct CommentQuery {
    pub review_id: Option<String>,
    pub status: Option<CommentStatus>,
    pub featured: Option<bool>,
    /// `status = reported OR reports >= n`
    pub needs_attention: Option<i32>,
    /// Case-insensitive substring of the author name
    pub author_contains: Option<String>,
    pub order: SortOrder,
    pub limit: Option<u64>,
}

impl CommentQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn review(mut self, review_id: &str) -> Self {
        self.review_id = Some(review_id.to_string());
        self
    }

    pub fn status(mut self, status: CommentStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn featured(mut self, featured: bool) -> Self {
        self.featured = Some(featured);
        self
    }

    pub fn needs_attention(mut self, min_reports: i32) -> Self {
        self.needs_attention = Some(min_reports);
        self
    }

    pub fn author_contains(mut self, needle: &str) -> Self {
        self.author_contains = Some(needle.to_string());
        self
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Evaluate the filter part of the query against a single record.
    pub fn matches(&self, comment: &Comment) -> bool {
        if let Some(ref review_id) = self.review_id {
            if &comment.review_id != review_id {
                return false;
            }
        }
        if let Some(status) = self.status {
            if comment.status != status {
                return false;
            }
        }
        if let Some(featured) = self.featured {
            if comment.featured != featured {
                return false;
            }
        }
        if let Some(min_reports) = self.needs_attention {
            if comment.status != CommentStatus::Reported && comment.reports < min_reports {
                return false;
            }
        }
        if let Some(ref needle) = self.author_contains {
            if !comment
                .author
                .to_lowercase()
                .contains(&needle.to_lowercase())
            {
                return false;
            }
        }
        true
    }
}

/// Field changes applied by a moderation action. `None` leaves the field alone.
#[derive(Debug, Clone, Default)]
pub struct CommentPatch {
    pub status: Option<CommentStatus>,
    pub reset_reports: bool,
    pub author: Option<String>,
    pub content: Option<String>,
}

impl CommentPatch {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && !self.reset_reports
            && self.author.is_none()
            && self.content.is_none()
    }
}

/// Trait for comment store backends.
///
/// Methods addressing a single comment return `Ok(None)` when it does not
/// exist; the caller decides whether that is an error.
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Persist a new comment in its initial state.
    async fn insert(&self, comment: NewComment) -> Result<Comment, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, StoreError>;

    /// Persist `comment` unless one with the same origin and content was
    /// created at or after `since`, in which case `Ok(None)` is returned.
    ///
    /// The lookup and the insert are one atomic step: of several identical
    /// submissions racing each other, at most one is stored.
    async fn insert_unless_duplicate(
        &self,
        comment: NewComment,
        since: DateTime<Utc>,
    ) -> Result<Option<Comment>, StoreError>;

    /// Atomically add one like.
    async fn increment_likes(&self, id: Uuid) -> Result<Option<Comment>, StoreError>;

    /// Atomically add one report and apply threshold escalation.
    async fn increment_reports(
        &self,
        id: Uuid,
        policy: &ModerationPolicy,
    ) -> Result<Option<Comment>, StoreError>;

    async fn update(&self, id: Uuid, patch: CommentPatch) -> Result<Option<Comment>, StoreError>;

    /// Atomically flip the featured flag.
    async fn toggle_featured(&self, id: Uuid) -> Result<Option<Comment>, StoreError>;

    /// Returns whether a comment was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn list(&self, query: &CommentQuery) -> Result<Vec<Comment>, StoreError>;

    /// Count matching comments. Ordering and limit are ignored.
    async fn count(&self, query: &CommentQuery) -> Result<u64, StoreError>;
}
