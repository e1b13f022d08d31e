//! Background job: drop expired tokens from the in-memory store.
//!
//! Optional. Without it expired tokens are only removed when a lookup
//! touches them, so unused ones stay in memory until restart.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time;

use crate::auth::TokenStore;

/// Spawn the sweep task. Call this once at startup.
pub fn spawn(store: Arc<TokenStore>, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = time::interval(every);
        loop {
            interval.tick().await;
            sweep(&store);
        }
    })
}

fn sweep(store: &TokenStore) -> usize {
    let removed = store.evict_expired(Utc::now());
    if removed > 0 {
        tracing::info!(removed, remaining = store.len(), "swept expired tokens");
    }
    removed
}
