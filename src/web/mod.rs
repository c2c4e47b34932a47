pub mod admin;
pub mod comments;

use crate::comment::{Comment, ReviewStats};
use crate::error::ModerationError;
use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Serialize;
use uuid::Uuid;

/// Configures the web app by adding services from each web file.
pub fn configure(conf: &mut web::ServiceConfig) {
    conf.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error));

    // Route resolution stops at the first match. Each module registers its
    // fixed paths before its `{id}` paths.
    admin::configure(conf);
    comments::configure(conf);
}

/// Malformed JSON bodies get the same response shape as every other failure.
fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    log::debug!("Rejected JSON payload: {}", err);
    ModerationError::Validation("Malformed request body.".to_string()).into()
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    log::debug!("Rejected query string: {}", err);
    ModerationError::Validation("Malformed query string.".to_string()).into()
}

/// Ids that don't parse cannot name an existing comment.
pub(crate) fn parse_id(raw: &str) -> Result<Uuid, ModerationError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ModerationError::NotFound)
}

/// JSON envelope shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<Comment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<Comment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likes: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reports: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<ReviewStats>,
}

impl ApiResponse {
    pub fn message(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            comment: None,
            comments: None,
            count: None,
            likes: None,
            reports: None,
            stats: None,
        }
    }

    pub fn with_comment(message: &str, comment: Comment) -> Self {
        Self {
            comment: Some(comment),
            ..Self::message(message)
        }
    }

    pub fn with_comments(message: &str, comments: Vec<Comment>) -> Self {
        Self {
            count: Some(comments.len()),
            comments: Some(comments),
            ..Self::message(message)
        }
    }

    pub fn ok(self) -> HttpResponse {
        HttpResponse::Ok().json(self)
    }
}
