use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::auth::{AuthRejection, IssueError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("unauthorized: {0}")]
    Unauthorized(#[from] AuthRejection),

    #[error("token issuance failed: {0}")]
    Issue(#[from] IssueError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

fn internal() -> (StatusCode, &'static str, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "internal_server_error",
        "internal server error".to_string(),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, code, msg) = match &self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "invalid_request_error",
                "validation_failed",
                msg.clone(),
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                "not_found_error",
                "not_found",
                msg.clone(),
            ),
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                "invalid_request_error",
                "conflict",
                msg.clone(),
            ),
            AppError::Unauthorized(reason) => {
                tracing::warn!(reason = reason.code(), "request rejected");
                (
                    StatusCode::UNAUTHORIZED,
                    "authentication_error",
                    reason.code(),
                    reason.to_string(),
                )
            }
            AppError::Issue(e) => match e {
                IssueError::Validation => (
                    StatusCode::BAD_REQUEST,
                    "invalid_request_error",
                    "validation_failed",
                    e.to_string(),
                ),
                // Distinct from bad credentials; lets callers probe usernames.
                IssueError::UserNotFound => (
                    StatusCode::NOT_FOUND,
                    "not_found_error",
                    "user_not_found",
                    e.to_string(),
                ),
                IssueError::Key(_) | IssueError::Encryption(_) => {
                    tracing::error!("Token encryption error: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal_error",
                        "internal_server_error",
                        "failed to encrypt token".to_string(),
                    )
                }
                IssueError::Directory(_) => {
                    tracing::error!("Directory error: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal_error",
                        "internal_server_error",
                        "failed to get user public key".to_string(),
                    )
                }
            },
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                internal()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                internal()
            }
        };

        let body = Json(json!({
            "error": {
                "message": msg,
                "type": error_type,
                "code": code,
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::crypto::KeyError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::Conflict("x".into()), StatusCode::CONFLICT),
            (
                AppError::Unauthorized(AuthRejection::IdentityMismatch),
                StatusCode::UNAUTHORIZED,
            ),
            (AppError::Issue(IssueError::Validation), StatusCode::BAD_REQUEST),
            (AppError::Issue(IssueError::UserNotFound), StatusCode::NOT_FOUND),
            (
                AppError::Issue(IssueError::Key(KeyError::UnsupportedKeyType)),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::Internal(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
