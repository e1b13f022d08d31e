use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

/// How long an issued token stays valid.
pub const TOKEN_VALIDITY_SECS: i64 = 3600;

/// A token handed out by the issuer, keyed by its plaintext value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRecord {
    pub token: String,
    pub owner_username: String,
    pub issued_at: DateTime<Utc>,
}

impl TokenRecord {
    /// A record stays live through `issued_at + window` inclusive and
    /// expires the instant after.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.issued_at > Duration::seconds(TOKEN_VALIDITY_SECS)
    }
}

/// In-memory token registry shared by the issuer and the gate.
///
/// Expiry is lazy: a lookup that finds an expired record removes it.
/// Nothing else shrinks the map unless `evict_expired()` is called
/// (see `jobs::sweep`).
#[derive(Debug, Default)]
pub struct TokenStore {
    records: DashMap<String, TokenRecord>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record, overwriting any previous one with the same token.
    pub fn put(&self, token: &str, username: &str, now: DateTime<Utc>) {
        self.records.insert(
            token.to_string(),
            TokenRecord {
                token: token.to_string(),
                owner_username: username.to_string(),
                issued_at: now,
            },
        );
    }

    /// Returns the owner of a live token. An expired record is purged.
    pub fn lookup(&self, token: &str, now: DateTime<Utc>) -> Option<String> {
        if let Some(record) = self.records.get(token) {
            if !record.is_expired(now) {
                return Some(record.owner_username.clone());
            }
            // drop the shard guard before removing
            drop(record);
            // only remove if still expired: a concurrent put may have replaced it
            if self
                .records
                .remove_if(token, |_, r| r.is_expired(now))
                .is_some()
            {
                tracing::debug!("purged expired token on lookup");
            }
        }
        None
    }

    pub fn delete(&self, token: &str) {
        self.records.remove(token);
    }

    /// Drops every expired record. Returns how many were removed.
    pub fn evict_expired(&self, now: DateTime<Utc>) -> usize {
        let before = self.records.len();
        self.records.retain(|_, r| !r.is_expired(now));
        before.saturating_sub(self.records.len())
    }

    /// Number of records physically held, expired or not.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
