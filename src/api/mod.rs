use std::sync::Arc;

use axum::{
    http::{HeaderName, Method, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::auth::require_auth;
use crate::middleware::headers;
use crate::AppState;

pub mod auth;
pub mod messages;
pub mod users;

/// Build the full HTTP router.
///
/// Public: `/healthz`, `POST /auth/token`, `POST /users`.
/// Everything else requires a bearer token bound to `X-User`.
pub fn router(state: Arc<AppState>) -> Router {
    let gate = middleware::from_fn_with_state(state.clone(), require_auth);

    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route("/auth/token", post(auth::request_token))
        .route(
            "/users",
            post(users::create_user).merge(get(users::list_users).route_layer(gate.clone())),
        )
        .route("/users/:id", get(users::get_user).route_layer(gate.clone()))
        .route(
            "/messages",
            get(messages::list_messages)
                .post(messages::create_message)
                .route_layer(gate.clone()),
        )
        .route(
            "/messages/getDiscussions",
            get(messages::get_discussions).route_layer(gate.clone()),
        )
        .route(
            "/messages/getMessagesWith/:user_id",
            get(messages::get_messages_with).route_layer(gate),
        )
        .fallback(fallback_404)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([
                    HeaderName::from_static("content-type"),
                    HeaderName::from_static("authorization"),
                    HeaderName::from_static("x-user"),
                    HeaderName::from_static("x-request-id"),
                ]),
        )
        .layer(middleware::from_fn(headers::request_id))
        .layer(middleware::from_fn(headers::security_headers))
}

async fn fallback_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": {
                "message": "Page not found",
                "type": "not_found_error",
                "code": "page_not_found",
            }
        })),
    )
}
