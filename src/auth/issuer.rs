use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use super::crypto::{self, KeyError};
use super::directory::UserDirectory;
use super::store::TokenStore;

#[derive(Debug, Error)]
pub enum IssueError {
    #[error("username is required")]
    Validation,

    #[error("user not found")]
    UserNotFound,

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error("failed to encrypt token: {0}")]
    Encryption(#[from] rsa::Error),

    #[error("directory lookup failed: {0}")]
    Directory(#[source] anyhow::Error),
}

/// Hands out fresh tokens, encrypted so that only the key holder can use them.
#[derive(Clone)]
pub struct TokenIssuer {
    store: Arc<TokenStore>,
    directory: Arc<dyn UserDirectory>,
}

impl TokenIssuer {
    pub fn new(store: Arc<TokenStore>, directory: Arc<dyn UserDirectory>) -> Self {
        Self { store, directory }
    }

    /// Issues a token for `username` and returns it encrypted (base64).
    ///
    /// The plaintext token is registered in the store only after encryption
    /// succeeds, so a failed call leaves the store untouched.
    pub async fn issue(&self, username: &str) -> Result<String, IssueError> {
        if username.is_empty() {
            return Err(IssueError::Validation);
        }

        let public_key_pem = self
            .directory
            .public_key(username)
            .await
            .map_err(IssueError::Directory)?
            .ok_or(IssueError::UserNotFound)?;

        let token = generate_token();
        let public_key = crypto::parse_public_key(&public_key_pem)?;
        let encrypted = crypto::encrypt_token(&token, &public_key)?;

        self.store.put(&token, username, Utc::now());
        tracing::info!(user = %username, "issued token");

        Ok(encrypted)
    }
}

/// Random v4 UUID, formatted as a hyphenated string.
fn generate_token() -> String {
    uuid::Uuid::new_v4().to_string()
}
