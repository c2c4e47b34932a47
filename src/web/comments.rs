//! Public comment endpoints

use super::{parse_id, ApiResponse};
use crate::comment::ModerationPolicy;
use crate::error::ModerationError;
use crate::intake::{self, Intake, Submission};
use crate::ip::client_origin;
use crate::store::CommentStore;
use crate::{engagement, listing, rate_limit};
use actix_web::{get, post, put, web, HttpRequest, HttpResponse};
use serde::Deserialize;
use std::sync::Arc;

const SUBMITTED_MESSAGE: &str = "Comment submitted successfully and is awaiting approval.";

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(featured_comments)
        .service(popular_comments)
        .service(submit_comment)
        .service(like_comment)
        .service(report_comment)
        .service(review_comments);
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeaturedQuery {
    review_id: Option<String>,
}

#[derive(Deserialize)]
struct PopularQuery {
    limit: Option<u64>,
}

/// Submit a new comment for moderation
#[post("/api/comments")]
async fn submit_comment(
    req: HttpRequest,
    store: web::Data<Arc<dyn CommentStore>>,
    policy: web::Data<ModerationPolicy>,
    form: web::Json<Submission>,
) -> Result<HttpResponse, ModerationError> {
    let origin = client_origin(&req);
    rate_limit::check_submit_rate_limit(&origin)?;

    match intake::submit(store.get_ref().as_ref(), &policy, form.into_inner(), &origin).await? {
        Intake::Accepted(comment) => Ok(ApiResponse::with_comment(SUBMITTED_MESSAGE, comment).ok()),
        // Same answer a human gets, minus the record
        Intake::Trapped => Ok(ApiResponse::message(SUBMITTED_MESSAGE).ok()),
    }
}

/// Featured approved comments, optionally for one review
#[get("/api/comments/featured")]
async fn featured_comments(
    store: web::Data<Arc<dyn CommentStore>>,
    policy: web::Data<ModerationPolicy>,
    query: web::Query<FeaturedQuery>,
) -> Result<HttpResponse, ModerationError> {
    let review_id = query
        .review_id
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty());
    let comments = listing::featured(store.get_ref().as_ref(), &policy, review_id).await?;
    Ok(ApiResponse::with_comments("Featured comments.", comments).ok())
}

/// Most liked approved comments
#[get("/api/comments/popular")]
async fn popular_comments(
    store: web::Data<Arc<dyn CommentStore>>,
    policy: web::Data<ModerationPolicy>,
    query: web::Query<PopularQuery>,
) -> Result<HttpResponse, ModerationError> {
    let comments = listing::popular(store.get_ref().as_ref(), &policy, query.limit).await?;
    Ok(ApiResponse::with_comments("Popular comments.", comments).ok())
}

#[put("/api/comments/{id}/like")]
async fn like_comment(
    req: HttpRequest,
    store: web::Data<Arc<dyn CommentStore>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ModerationError> {
    rate_limit::check_like_rate_limit(&client_origin(&req))?;
    let id = parse_id(&path)?;

    let comment = engagement::like(store.get_ref().as_ref(), id).await?;
    Ok(ApiResponse {
        likes: Some(comment.likes),
        ..ApiResponse::message("Like added.")
    }
    .ok())
}

#[put("/api/comments/{id}/report")]
async fn report_comment(
    req: HttpRequest,
    store: web::Data<Arc<dyn CommentStore>>,
    policy: web::Data<ModerationPolicy>,
    path: web::Path<String>,
) -> Result<HttpResponse, ModerationError> {
    rate_limit::check_report_rate_limit(&client_origin(&req))?;
    let id = parse_id(&path)?;

    let comment = engagement::report(store.get_ref().as_ref(), &policy, id).await?;
    Ok(ApiResponse {
        reports: Some(comment.reports),
        ..ApiResponse::message("Comment reported.")
    }
    .ok())
}

/// Approved comments on a review, newest first
#[get("/api/comments/{review_id}")]
async fn review_comments(
    store: web::Data<Arc<dyn CommentStore>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ModerationError> {
    let comments = listing::approved_for_review(store.get_ref().as_ref(), path.trim()).await?;
    Ok(ApiResponse::with_comments("Review comments.", comments).ok())
}
