//! Admin moderation endpoints. Every handler requires an `AdminIdentity`.

use super::{parse_id, ApiResponse};
use crate::comment::ModerationPolicy;
use crate::error::ModerationError;
use crate::listing;
use crate::middleware::AdminIdentity;
use crate::moderation::{self, CommentEdit};
use crate::store::CommentStore;
use actix_web::{delete, get, put, web, HttpResponse};
use serde::Deserialize;
use std::sync::Arc;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_all)
        .service(view_pending)
        .service(view_reported)
        .service(view_review_stats)
        .service(view_user_comments)
        .service(approve_comment)
        .service(reject_comment)
        .service(toggle_featured)
        .service(update_comment)
        .service(delete_comment);
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PendingQuery {
    review_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserQuery {
    user_name: Option<String>,
}

#[get("/api/admin/comments")]
async fn view_all(
    _admin: AdminIdentity,
    store: web::Data<Arc<dyn CommentStore>>,
) -> Result<HttpResponse, ModerationError> {
    let comments = listing::all(store.get_ref().as_ref()).await?;
    Ok(ApiResponse::with_comments("All comments.", comments).ok())
}

/// Pending comments, or the oldest-first queue of one review with `?reviewId=`
#[get("/api/admin/comments/pending")]
async fn view_pending(
    _admin: AdminIdentity,
    store: web::Data<Arc<dyn CommentStore>>,
    query: web::Query<PendingQuery>,
) -> Result<HttpResponse, ModerationError> {
    let store = store.get_ref().as_ref();
    let comments = match query.review_id.as_deref().map(str::trim) {
        Some(review_id) if !review_id.is_empty() => {
            listing::pending_for_review(store, review_id).await?
        }
        _ => listing::pending(store).await?,
    };
    Ok(ApiResponse::with_comments("Pending comments.", comments).ok())
}

#[get("/api/admin/comments/reported")]
async fn view_reported(
    _admin: AdminIdentity,
    store: web::Data<Arc<dyn CommentStore>>,
    policy: web::Data<ModerationPolicy>,
) -> Result<HttpResponse, ModerationError> {
    let comments = listing::needs_attention(store.get_ref().as_ref(), &policy).await?;
    Ok(ApiResponse::with_comments("Reported comments.", comments).ok())
}

#[get("/api/admin/comments/stats/{review_id}")]
async fn view_review_stats(
    _admin: AdminIdentity,
    store: web::Data<Arc<dyn CommentStore>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ModerationError> {
    let stats = listing::review_stats(store.get_ref().as_ref(), path.trim()).await?;
    Ok(ApiResponse {
        stats: Some(stats),
        ..ApiResponse::message("Review comment statistics.")
    }
    .ok())
}

#[get("/api/admin/comments/user")]
async fn view_user_comments(
    _admin: AdminIdentity,
    store: web::Data<Arc<dyn CommentStore>>,
    query: web::Query<UserQuery>,
) -> Result<HttpResponse, ModerationError> {
    let name = query.user_name.as_deref().unwrap_or_default();
    let comments = listing::by_author(store.get_ref().as_ref(), name).await?;
    Ok(ApiResponse::with_comments("User comments.", comments).ok())
}

#[put("/api/admin/comments/{id}/approve")]
async fn approve_comment(
    admin: AdminIdentity,
    store: web::Data<Arc<dyn CommentStore>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ModerationError> {
    let id = parse_id(&path)?;
    let comment = moderation::approve(store.get_ref().as_ref(), &admin, id).await?;
    Ok(ApiResponse::with_comment("Comment approved.", comment).ok())
}

#[put("/api/admin/comments/{id}/reject")]
async fn reject_comment(
    admin: AdminIdentity,
    store: web::Data<Arc<dyn CommentStore>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ModerationError> {
    let id = parse_id(&path)?;
    let comment = moderation::reject(store.get_ref().as_ref(), &admin, id).await?;
    Ok(ApiResponse::with_comment("Comment rejected.", comment).ok())
}

#[put("/api/admin/comments/{id}/featured")]
async fn toggle_featured(
    admin: AdminIdentity,
    store: web::Data<Arc<dyn CommentStore>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ModerationError> {
    let id = parse_id(&path)?;
    let comment = moderation::toggle_featured(store.get_ref().as_ref(), &admin, id).await?;
    let message = if comment.featured {
        "Comment featured."
    } else {
        "Comment no longer featured."
    };
    Ok(ApiResponse::with_comment(message, comment).ok())
}

#[put("/api/admin/comments/{id}/update")]
async fn update_comment(
    admin: AdminIdentity,
    store: web::Data<Arc<dyn CommentStore>>,
    policy: web::Data<ModerationPolicy>,
    path: web::Path<String>,
    form: web::Json<CommentEdit>,
) -> Result<HttpResponse, ModerationError> {
    let id = parse_id(&path)?;
    let comment = moderation::edit(
        store.get_ref().as_ref(),
        &policy,
        &admin,
        id,
        form.into_inner(),
    )
    .await?;
    Ok(ApiResponse::with_comment("Comment updated.", comment).ok())
}

#[delete("/api/admin/comments/{id}")]
async fn delete_comment(
    admin: AdminIdentity,
    store: web::Data<Arc<dyn CommentStore>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ModerationError> {
    let id = parse_id(&path)?;
    moderation::delete(store.get_ref().as_ref(), &admin, id).await?;
    Ok(ApiResponse::message("Comment deleted.").ok())
}
