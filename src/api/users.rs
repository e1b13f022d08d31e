use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::auth::crypto;
use crate::errors::AppError;
use crate::store::sqlite::UserRow;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub public_key: String,
}

/// POST /users — register a user and the public key tokens are encrypted to
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserRow>), AppError> {
    let Json(req) = payload.map_err(|e| AppError::Validation(e.body_text()))?;

    if req.username.is_empty() {
        return Err(AppError::Validation("username is required".into()));
    }
    if req.public_key.is_empty() {
        return Err(AppError::Validation("publicKey is required".into()));
    }
    // Reject keys the issuer could never encrypt a token to.
    crypto::parse_public_key(&req.public_key)
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let id = state
        .db
        .create_user(&req.username, &req.public_key)
        .await?
        .ok_or_else(|| AppError::Conflict("username already exists".into()))?;

    tracing::info!(user = %req.username, id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(UserRow {
            id,
            username: req.username,
        }),
    ))
}

/// GET /users — list all users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserRow>>, AppError> {
    Ok(Json(state.db.list_users().await?))
}

/// GET /users/:id
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<UserRow>, AppError> {
    let Path(id) = id.map_err(|_| AppError::Validation("Invalid user ID".into()))?;

    state
        .db
        .get_user(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("user not found".into()))
}
