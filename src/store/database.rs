//! PostgreSQL comment store backed by SeaORM.
//!
//! Counter updates are single `UPDATE .. RETURNING` statements. The report
//! escalation is expressed as a `CASE` over the pre-update row so that the
//! increment and any status change land in the same write.

use super::{CommentPatch, CommentQuery, CommentStore, SortOrder};
use crate::comment::{Comment, CommentSource, CommentStatus, ModerationPolicy, NewComment};
use crate::error::StoreError;
use crate::orm::comments;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    entity::*, query::*, ActiveValue::Set, Condition, ConnectionTrait, DatabaseConnection,
    DbBackend, PaginatorTrait, Select, Statement, TransactionTrait,
};
use uuid::Uuid;

const INCREMENT_LIKES_SQL: &str = r#"
UPDATE comments
SET likes = likes + 1, updated_at = $2
WHERE id = $1
RETURNING *"#;

const INCREMENT_REPORTS_SQL: &str = r#"
UPDATE comments
SET reports = reports + 1,
    updated_at = $2,
    status = CASE
        WHEN reports + 1 >= $3 THEN 'rejected'
        WHEN reports + 1 >= $4 AND status IN ('pending', 'approved') THEN 'reported'
        ELSE status
    END
WHERE id = $1
RETURNING *"#;

/// Per-origin lock held until the surrounding transaction ends.
const ORIGIN_LOCK_SQL: &str = "SELECT pg_advisory_xact_lock(hashtext($1))";

const TOGGLE_FEATURED_SQL: &str = r#"
UPDATE comments
SET featured = NOT featured, updated_at = $2
WHERE id = $1
RETURNING *"#;

pub struct DatabaseStore {
    db: DatabaseConnection,
}

impl DatabaseStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn update_returning(
        &self,
        sql: &str,
        values: Vec<sea_orm::Value>,
    ) -> Result<Option<Comment>, StoreError> {
        let model = comments::Entity::find()
            .from_raw_sql(Statement::from_sql_and_values(
                DbBackend::Postgres,
                sql,
                values,
            ))
            .one(&self.db)
            .await?;

        model.map(Comment::try_from).transpose()
    }

    fn active_model(comment: NewComment) -> comments::ActiveModel {
        comments::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            review_id: Set(comment.review_id),
            author: Set(comment.author),
            email: Set(comment.email),
            content: Set(comment.content),
            status: Set(CommentStatus::Pending.as_str().to_string()),
            likes: Set(0),
            reports: Set(0),
            featured: Set(false),
            source: Set(comment.source.as_str().to_string()),
            user_ip: Set(comment.user_ip),
            created_at: Set(comment.created_at),
            updated_at: Set(comment.created_at),
        }
    }

    fn select(query: &CommentQuery) -> Select<comments::Entity> {
        let mut select = comments::Entity::find();

        if let Some(ref review_id) = query.review_id {
            select = select.filter(comments::Column::ReviewId.eq(review_id.clone()));
        }
        if let Some(status) = query.status {
            select = select.filter(comments::Column::Status.eq(status.as_str()));
        }
        if let Some(featured) = query.featured {
            select = select.filter(comments::Column::Featured.eq(featured));
        }
        if let Some(min_reports) = query.needs_attention {
            select = select.filter(
                Condition::any()
                    .add(comments::Column::Status.eq(CommentStatus::Reported.as_str()))
                    .add(comments::Column::Reports.gte(min_reports)),
            );
        }
        if let Some(ref needle) = query.author_contains {
            let pattern = format!("%{}%", escape_like(&needle.to_lowercase()));
            select = select.filter(Expr::cust_with_values(
                "LOWER(author) LIKE ?",
                vec![pattern],
            ));
        }

        select
    }
}

/// Escape LIKE wildcards so user input matches literally.
fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

impl TryFrom<comments::Model> for Comment {
    type Error = StoreError;

    fn try_from(model: comments::Model) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&model.id)
            .map_err(|e| StoreError::Corrupt(format!("comment id {}: {}", model.id, e)))?;
        let status = CommentStatus::parse(&model.status).ok_or_else(|| {
            StoreError::Corrupt(format!("comment {} has status {}", model.id, model.status))
        })?;

        Ok(Comment {
            id,
            review_id: model.review_id,
            author: model.author,
            email: model.email,
            content: model.content,
            status,
            likes: model.likes,
            reports: model.reports,
            featured: model.featured,
            source: CommentSource::parse_lenient(Some(&model.source)),
            user_ip: model.user_ip,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[async_trait]
impl CommentStore for DatabaseStore {
    async fn insert(&self, comment: NewComment) -> Result<Comment, StoreError> {
        let model = Self::active_model(comment).insert(&self.db).await?;
        Comment::try_from(model)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, StoreError> {
        comments::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await?
            .map(Comment::try_from)
            .transpose()
    }

    async fn insert_unless_duplicate(
        &self,
        comment: NewComment,
        since: DateTime<Utc>,
    ) -> Result<Option<Comment>, StoreError> {
        let txn = self.db.begin().await?;

        // Identical submissions from one origin queue up here until the
        // first one commits, then see its row.
        txn.execute(Statement::from_sql_and_values(
            DbBackend::Postgres,
            ORIGIN_LOCK_SQL,
            vec![comment.user_ip.clone().into()],
        ))
        .await?;

        let duplicate = comments::Entity::find()
            .filter(comments::Column::UserIp.eq(comment.user_ip.as_str()))
            .filter(comments::Column::Content.eq(comment.content.as_str()))
            .filter(comments::Column::CreatedAt.gte(since))
            .one(&txn)
            .await?;
        if duplicate.is_some() {
            txn.rollback().await?;
            return Ok(None);
        }

        let model = Self::active_model(comment).insert(&txn).await?;
        txn.commit().await?;

        Comment::try_from(model).map(Some)
    }

    async fn increment_likes(&self, id: Uuid) -> Result<Option<Comment>, StoreError> {
        self.update_returning(
            INCREMENT_LIKES_SQL,
            vec![id.to_string().into(), Utc::now().into()],
        )
        .await
    }

    async fn increment_reports(
        &self,
        id: Uuid,
        policy: &ModerationPolicy,
    ) -> Result<Option<Comment>, StoreError> {
        self.update_returning(
            INCREMENT_REPORTS_SQL,
            vec![
                id.to_string().into(),
                Utc::now().into(),
                policy.reject_threshold.into(),
                policy.report_threshold.into(),
            ],
        )
        .await
    }

    async fn update(&self, id: Uuid, patch: CommentPatch) -> Result<Option<Comment>, StoreError> {
        if patch.is_empty() {
            return self.find_by_id(id).await;
        }

        let mut update = comments::Entity::update_many()
            .col_expr(comments::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(comments::Column::Id.eq(id.to_string()));

        if let Some(status) = patch.status {
            update = update.col_expr(comments::Column::Status, Expr::value(status.as_str()));
        }
        if patch.reset_reports {
            update = update.col_expr(comments::Column::Reports, Expr::value(0));
        }
        if let Some(author) = patch.author {
            update = update.col_expr(comments::Column::Author, Expr::value(author));
        }
        if let Some(content) = patch.content {
            update = update.col_expr(comments::Column::Content, Expr::value(content));
        }

        let result = update.exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Ok(None);
        }

        self.find_by_id(id).await
    }

    async fn toggle_featured(&self, id: Uuid) -> Result<Option<Comment>, StoreError> {
        self.update_returning(
            TOGGLE_FEATURED_SQL,
            vec![id.to_string().into(), Utc::now().into()],
        )
        .await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = comments::Entity::delete_by_id(id.to_string())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn list(&self, query: &CommentQuery) -> Result<Vec<Comment>, StoreError> {
        let mut select = Self::select(query);

        select = match query.order {
            SortOrder::NewestFirst => select.order_by_desc(comments::Column::CreatedAt),
            SortOrder::OldestFirst => select.order_by_asc(comments::Column::CreatedAt),
            SortOrder::MostLiked => select
                .order_by_desc(comments::Column::Likes)
                .order_by_desc(comments::Column::CreatedAt),
            SortOrder::MostReported => select
                .order_by_desc(comments::Column::Reports)
                .order_by_desc(comments::Column::CreatedAt),
        };

        if let Some(limit) = query.limit {
            select = select.limit(limit);
        }

        select
            .all(&self.db)
            .await?
            .into_iter()
            .map(Comment::try_from)
            .collect()
    }

    async fn count(&self, query: &CommentQuery) -> Result<u64, StoreError> {
        let count = Self::select(query).count(&self.db).await?;
        Ok(count as u64)
    }
}
