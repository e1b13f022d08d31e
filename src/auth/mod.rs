//! Public-key token authentication.
//!
//! 1. A client asks for a token by username (`TokenIssuer::issue`).
//! 2. The token is encrypted with the user's registered RSA key, so only
//!    the private-key holder can recover it.
//! 3. Protected requests carry `Authorization: Bearer <token>` and
//!    `X-User: <username>`; `AuthGate` checks both against `TokenStore`.
//!
//! Tokens live in memory for one hour and vanish on restart.

pub mod crypto;
pub mod directory;
pub mod gate;
pub mod issuer;
pub mod store;

pub use directory::UserDirectory;
pub use gate::{AuthGate, AuthRejection, AuthenticatedUser, Credential};
pub use issuer::{IssueError, TokenIssuer};
pub use store::{TokenRecord, TokenStore, TOKEN_VALIDITY_SECS};
