#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use base64::Engine;
use once_cell::sync::Lazy;
use rsa::pkcs8::{EncodePublicKey, LineEnding};
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use serde_json::Value;
use sha2::Sha256;
use tower::ServiceExt;

use enigma::store::sqlite::SqliteStore;
use enigma::{api, AppState};

/// Key generation is slow in debug builds; share one key per identity.
pub static ALICE_KEY: Lazy<RsaPrivateKey> =
    Lazy::new(|| RsaPrivateKey::new(&mut rand::thread_rng(), 1024).unwrap());
pub static BOB_KEY: Lazy<RsaPrivateKey> =
    Lazy::new(|| RsaPrivateKey::new(&mut rand::thread_rng(), 1024).unwrap());

pub fn public_pem(key: &RsaPrivateKey) -> String {
    RsaPublicKey::from(key)
        .to_public_key_pem(LineEnding::LF)
        .unwrap()
}

pub fn decrypt(key: &RsaPrivateKey, encrypted_b64: &str) -> String {
    let ct = base64::engine::general_purpose::STANDARD
        .decode(encrypted_b64)
        .unwrap();
    String::from_utf8(key.decrypt(Oaep::new::<Sha256>(), &ct).unwrap()).unwrap()
}

pub async fn app() -> (Router, Arc<AppState>) {
    let db = SqliteStore::connect("sqlite::memory:").await.unwrap();
    db.migrate().await.unwrap();
    let state = Arc::new(AppState::new(db));
    (api::router(state.clone()), state)
}

pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// GET with optional `Authorization` and `X-User` headers.
pub fn get_as(uri: &str, authorization: Option<&str>, user: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(a) = authorization {
        builder = builder.header("authorization", a);
    }
    if let Some(u) = user {
        builder = builder.header("x-user", u);
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn register(app: &Router, username: &str, key: &RsaPrivateKey) -> i64 {
    let (status, body) = send(
        app,
        post_json(
            "/users",
            serde_json::json!({ "username": username, "publicKey": public_pem(key) }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register {}: {}", username, body);
    body["id"].as_i64().unwrap()
}

/// Full handshake: request a token and decrypt it with the user's key.
pub async fn login(app: &Router, username: &str, key: &RsaPrivateKey) -> String {
    let (status, body) = send(
        app,
        post_json("/auth/token", serde_json::json!({ "username": username })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "token for {}: {}", username, body);
    decrypt(key, body["encryptedToken"].as_str().unwrap())
}

pub fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap_or_default()
}
