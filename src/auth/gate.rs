use std::sync::Arc;

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use thiserror::Error;

use super::store::TokenStore;

pub const AUTHORIZATION_HEADER: &str = "authorization";
pub const IDENTITY_HEADER: &str = "x-user";
const BEARER_PREFIX: &str = "Bearer ";

/// Why a protected request was turned away. Checked in declaration order;
/// the first failing check wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthRejection {
    #[error("authorization header is required")]
    MissingAuthHeader,

    #[error("invalid authorization header format")]
    MalformedAuthHeader,

    #[error("invalid token")]
    InvalidOrExpiredToken,

    #[error("X-User header is required")]
    MissingIdentityHeader,

    #[error("invalid user for this token")]
    IdentityMismatch,
}

impl AuthRejection {
    /// Stable machine-readable code for error bodies and logs.
    pub fn code(&self) -> &'static str {
        match self {
            AuthRejection::MissingAuthHeader => "missing_auth_header",
            AuthRejection::MalformedAuthHeader => "malformed_auth_header",
            AuthRejection::InvalidOrExpiredToken => "invalid_or_expired_token",
            AuthRejection::MissingIdentityHeader => "missing_identity_header",
            AuthRejection::IdentityMismatch => "identity_mismatch",
        }
    }
}

/// Bearer token plus the identity the caller claims to be, as presented on
/// one request. The identity stays optional here so the gate can report a
/// bad token before a missing identity.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    pub claimed_username: Option<String>,
}

// Never print the token.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("claimed_username", &self.claimed_username)
            .finish()
    }
}

impl Credential {
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, AuthRejection> {
        let raw = headers
            .get(AUTHORIZATION_HEADER)
            .ok_or(AuthRejection::MissingAuthHeader)?;
        if raw.is_empty() {
            return Err(AuthRejection::MissingAuthHeader);
        }

        let token = raw
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix(BEARER_PREFIX))
            .ok_or(AuthRejection::MalformedAuthHeader)?;

        let claimed_username = headers
            .get(IDENTITY_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(String::from);

        Ok(Self {
            token: token.to_string(),
            claimed_username,
        })
    }
}

/// Identity admitted by the gate. Inserted into request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub username: String,
}

/// Request-authorization predicate backed by the token store.
#[derive(Clone)]
pub struct AuthGate {
    store: Arc<TokenStore>,
}

impl AuthGate {
    pub fn new(store: Arc<TokenStore>) -> Self {
        Self { store }
    }

    /// Validates the request headers at the current time.
    pub fn authorize(&self, headers: &HeaderMap) -> Result<AuthenticatedUser, AuthRejection> {
        let credential = Credential::from_headers(headers)?;
        self.verify(&credential, Utc::now())
    }

    /// Checks a credential as a unit: token must be live and owned by the
    /// claimed identity.
    pub fn verify(
        &self,
        credential: &Credential,
        now: DateTime<Utc>,
    ) -> Result<AuthenticatedUser, AuthRejection> {
        let owner = self
            .store
            .lookup(&credential.token, now)
            .ok_or(AuthRejection::InvalidOrExpiredToken)?;

        let claimed = credential
            .claimed_username
            .as_deref()
            .ok_or(AuthRejection::MissingIdentityHeader)?;

        if owner != claimed {
            return Err(AuthRejection::IdentityMismatch);
        }

        Ok(AuthenticatedUser { username: owner })
    }
}
