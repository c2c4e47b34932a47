//! Errors surfaced by the comment pipeline and how they map onto HTTP.
//!
//! Messages are stable and user-facing. Store driver detail is logged, never
//! returned to the client.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;

/// Failure inside a comment store backend.
#[derive(Debug)]
pub enum StoreError {
    /// Database driver error
    Database(sea_orm::DbErr),
    /// Row could not be mapped onto a comment
    Corrupt(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Database(e) => write!(f, "Database error: {}", e),
            StoreError::Corrupt(msg) => write!(f, "Corrupt record: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sea_orm::DbErr> for StoreError {
    fn from(e: sea_orm::DbErr) -> Self {
        StoreError::Database(e)
    }
}

#[derive(Debug)]
pub enum ModerationError {
    /// Missing or malformed input
    Validation(String),
    /// Same content from the same origin inside the suppression window
    Duplicate,
    /// Transport throttle exceeded
    Throttled { retry_after_seconds: u64 },
    /// Target comment does not exist
    NotFound,
    /// Admin gate refused the caller
    Unauthorized,
    /// Persistence failure
    Store(StoreError),
}

impl ModerationError {
    /// Message safe to show to clients.
    pub fn public_message(&self) -> String {
        match self {
            ModerationError::Validation(msg) => msg.clone(),
            ModerationError::Duplicate => {
                "Please wait before posting the same comment again.".to_string()
            }
            ModerationError::Throttled {
                retry_after_seconds,
            } => format!(
                "Too many requests. Try again in {} seconds.",
                retry_after_seconds
            ),
            ModerationError::NotFound => "Comment not found.".to_string(),
            ModerationError::Unauthorized => "Admin authorization required.".to_string(),
            ModerationError::Store(_) => {
                "Something went wrong. Please try again later.".to_string()
            }
        }
    }
}

impl std::fmt::Display for ModerationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModerationError::Store(e) => write!(f, "{}", e),
            other => f.write_str(&other.public_message()),
        }
    }
}

impl std::error::Error for ModerationError {}

impl From<StoreError> for ModerationError {
    fn from(e: StoreError) -> Self {
        ModerationError::Store(e)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
}

impl ResponseError for ModerationError {
    fn status_code(&self) -> StatusCode {
        match self {
            ModerationError::Validation(_) => StatusCode::BAD_REQUEST,
            ModerationError::Duplicate | ModerationError::Throttled { .. } => {
                StatusCode::TOO_MANY_REQUESTS
            }
            ModerationError::NotFound => StatusCode::NOT_FOUND,
            ModerationError::Unauthorized => StatusCode::UNAUTHORIZED,
            ModerationError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ModerationError::Store(e) = self {
            log::error!("Comment store failure: {}", e);
        }

        let mut builder = HttpResponse::build(self.status_code());
        if let ModerationError::Throttled {
            retry_after_seconds,
        } = self
        {
            builder.insert_header(("Retry-After", retry_after_seconds.to_string()));
        }

        builder.json(ErrorBody {
            success: false,
            message: self.public_message(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ModerationError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ModerationError::Duplicate.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(ModerationError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ModerationError::Store(StoreError::Corrupt("bad".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_detail_hidden_from_clients() {
        let err = ModerationError::Store(StoreError::Database(sea_orm::DbErr::Custom(
            "relation \"comments\" does not exist".into(),
        )));
        assert!(!err.public_message().contains("relation"));
        assert!(err.to_string().contains("relation"));
    }

    #[test]
    fn test_throttled_sets_retry_after() {
        let response = ModerationError::Throttled {
            retry_after_seconds: 42,
        }
        .error_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get("Retry-After").unwrap().to_str().unwrap(),
            "42"
        );
    }
}
