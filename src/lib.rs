//! Enigma — messaging API with public-key token authentication.
//!
//! Library crate shared by the `enigma` binary and the integration tests.

use std::sync::Arc;

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod errors;
pub mod jobs;
pub mod middleware;
pub mod store;

use auth::{AuthGate, TokenIssuer, TokenStore};
use store::sqlite::SqliteStore;

/// Shared application state passed to handlers and middleware.
pub struct AppState {
    pub db: SqliteStore,
    pub tokens: Arc<TokenStore>,
    pub issuer: TokenIssuer,
    pub gate: AuthGate,
}

impl AppState {
    /// Wires one token store into both the issuer and the gate.
    pub fn new(db: SqliteStore) -> Self {
        let tokens = Arc::new(TokenStore::new());
        let issuer = TokenIssuer::new(tokens.clone(), Arc::new(db.clone()));
        let gate = AuthGate::new(tokens.clone());
        Self {
            db,
            tokens,
            issuer,
            gate,
        }
    }
}
