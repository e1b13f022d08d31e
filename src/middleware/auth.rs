use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::errors::AppError;
use crate::AppState;

/// Middleware: admits the request only if `Authorization: Bearer <token>`
/// and `X-User` name the same live token owner. The admitted identity is
/// stored as an `AuthenticatedUser` extension for downstream handlers.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = state.gate.authorize(req.headers())?;
    tracing::debug!(user = %user.username, "request authorized");
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
