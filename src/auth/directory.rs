use async_trait::async_trait;

/// Read-only view of registered users needed by the auth core.
/// Implementations: `SqliteStore` (production), in-memory maps in tests.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// PEM public key on file for `username`, `None` if the user is unknown.
    async fn public_key(&self, username: &str) -> anyhow::Result<Option<String>>;

    /// Numeric id for `username`, `None` if the user is unknown.
    async fn user_id(&self, username: &str) -> anyhow::Result<Option<i64>>;
}
