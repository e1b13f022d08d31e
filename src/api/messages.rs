use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::auth::{AuthenticatedUser, UserDirectory};
use crate::errors::AppError;
use crate::store::sqlite::{MessageRow, UserRow};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageRequest {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub sender_id: i64,
    #[serde(default)]
    pub receiver_id: i64,
}

/// GET /messages — every stored message
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MessageRow>>, AppError> {
    Ok(Json(state.db.list_messages().await?))
}

/// POST /messages
pub async fn create_message(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateMessageRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageRow>), AppError> {
    let Json(req) = payload.map_err(|e| AppError::Validation(e.body_text()))?;

    if req.content.is_empty() {
        return Err(AppError::Validation("content is required".into()));
    }
    if req.sender_id <= 0 {
        return Err(AppError::Validation(
            "senderId must be a positive integer".into(),
        ));
    }
    if req.receiver_id <= 0 {
        return Err(AppError::Validation(
            "receiverId must be a positive integer".into(),
        ));
    }

    let id = state
        .db
        .insert_message(&req.content, req.sender_id, req.receiver_id)
        .await?
        .ok_or_else(|| {
            AppError::Validation("senderId and receiverId must reference existing users".into())
        })?;

    Ok((
        StatusCode::CREATED,
        Json(MessageRow {
            id,
            content: req.content,
            sender_id: req.sender_id,
            receiver_id: req.receiver_id,
        }),
    ))
}

/// GET /messages/getDiscussions — users the caller has exchanged messages with
pub async fn get_discussions(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<UserRow>>, AppError> {
    let user_id = caller_id(&state, &user).await?;
    Ok(Json(state.db.list_discussion_partners(user_id).await?))
}

/// GET /messages/getMessagesWith/:user_id — conversation between the caller and another user
pub async fn get_messages_with(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    other: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<MessageRow>>, AppError> {
    let Path(other_id) = other.map_err(|_| AppError::Validation("Invalid user ID".into()))?;
    if other_id <= 0 {
        return Err(AppError::Validation(
            "userId must be a positive integer".into(),
        ));
    }

    let user_id = caller_id(&state, &user).await?;
    Ok(Json(state.db.list_messages_between(user_id, other_id).await?))
}

async fn caller_id(state: &AppState, user: &AuthenticatedUser) -> Result<i64, AppError> {
    state
        .db
        .user_id(&user.username)
        .await?
        .ok_or_else(|| AppError::Validation("user not found".into()))
}
