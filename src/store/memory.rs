//! In-memory comment store.
//!
//! Each record sits behind its own DashMap shard lock, so read-modify-write
//! on one comment is atomic with respect to concurrent callers.

use super::{CommentPatch, CommentQuery, CommentStore, SortOrder};
use crate::comment::{Comment, ModerationPolicy, NewComment};
use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::cmp::Ordering;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct Stored {
    /// Insertion sequence, breaks ties between equal timestamps
    seq: u64,
    comment: Comment,
}

#[derive(Default)]
pub struct MemoryStore {
    comments: DashMap<Uuid, Stored>,
    next_seq: AtomicU64,
    /// Serializes duplicate-checked inserts
    intake_lock: Mutex<()>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    fn store(&self, comment: NewComment) -> Comment {
        let id = Uuid::new_v4();
        let comment = comment.into_comment(id);
        let seq = self.next_seq.fetch_add(1, AtomicOrdering::SeqCst);

        self.comments.insert(
            id,
            Stored {
                seq,
                comment: comment.clone(),
            },
        );
        comment
    }

    fn has_recent_duplicate(&self, user_ip: &str, content: &str, since: DateTime<Utc>) -> bool {
        self.comments.iter().any(|entry| {
            let c = &entry.comment;
            c.user_ip == user_ip && c.content == content && c.created_at >= since
        })
    }

    /// Apply `f` to one record under its lock and return the result.
    fn modify<F>(&self, id: Uuid, f: F) -> Option<Comment>
    where
        F: FnOnce(&mut Comment),
    {
        let mut entry = self.comments.get_mut(&id)?;
        f(&mut entry.comment);
        entry.comment.updated_at = Utc::now();
        Some(entry.comment.clone())
    }
}

fn compare(order: SortOrder, a: &Stored, b: &Stored) -> Ordering {
    let newest_first = b
        .comment
        .created_at
        .cmp(&a.comment.created_at)
        .then(b.seq.cmp(&a.seq));

    match order {
        SortOrder::NewestFirst => newest_first,
        SortOrder::OldestFirst => newest_first.reverse(),
        SortOrder::MostLiked => b.comment.likes.cmp(&a.comment.likes).then(newest_first),
        SortOrder::MostReported => b.comment.reports.cmp(&a.comment.reports).then(newest_first),
    }
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn insert(&self, comment: NewComment) -> Result<Comment, StoreError> {
        Ok(self.store(comment))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, StoreError> {
        Ok(self.comments.get(&id).map(|entry| entry.comment.clone()))
    }

    async fn insert_unless_duplicate(
        &self,
        comment: NewComment,
        since: DateTime<Utc>,
    ) -> Result<Option<Comment>, StoreError> {
        // Poisoning leaves the map intact
        let _guard = self
            .intake_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if self.has_recent_duplicate(&comment.user_ip, &comment.content, since) {
            return Ok(None);
        }
        Ok(Some(self.store(comment)))
    }

    async fn increment_likes(&self, id: Uuid) -> Result<Option<Comment>, StoreError> {
        Ok(self.modify(id, |c| c.likes += 1))
    }

    async fn increment_reports(
        &self,
        id: Uuid,
        policy: &ModerationPolicy,
    ) -> Result<Option<Comment>, StoreError> {
        Ok(self.modify(id, |c| {
            c.reports += 1;
            c.status = c.status.after_report(c.reports, policy);
        }))
    }

    async fn update(&self, id: Uuid, patch: CommentPatch) -> Result<Option<Comment>, StoreError> {
        Ok(self.modify(id, |c| {
            if let Some(status) = patch.status {
                c.status = status;
            }
            if patch.reset_reports {
                c.reports = 0;
            }
            if let Some(author) = patch.author {
                c.author = author;
            }
            if let Some(content) = patch.content {
                c.content = content;
            }
        }))
    }

    async fn toggle_featured(&self, id: Uuid) -> Result<Option<Comment>, StoreError> {
        Ok(self.modify(id, |c| c.featured = !c.featured))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.comments.remove(&id).is_some())
    }

    async fn list(&self, query: &CommentQuery) -> Result<Vec<Comment>, StoreError> {
        let mut matched: Vec<Stored> = self
            .comments
            .iter()
            .filter(|entry| query.matches(&entry.comment))
            .map(|entry| entry.value().clone())
            .collect();

        matched.sort_by(|a, b| compare(query.order, a, b));

        let limit = query.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        Ok(matched
            .into_iter()
            .take(limit)
            .map(|stored| stored.comment)
            .collect())
    }

    async fn count(&self, query: &CommentQuery) -> Result<u64, StoreError> {
        Ok(self
            .comments
            .iter()
            .filter(|entry| query.matches(&entry.comment))
            .count() as u64)
    }
}
