//! Read-through cache for single-joke lookups.
//!
//! Entries expire individually; an optional background task sweeps expired
//! entries out so the map does not grow without bound.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::models::Joke;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Joke,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Keyed joke cache with per-entry expiry.
pub struct JokeCache {
    items: RwLock<HashMap<String, CacheEntry>>,
    default_ttl: Duration,
    sweep_interval: Duration,
}

impl JokeCache {
    /// A zero `default_ttl` keeps default entries forever; a zero `sweep_interval`
    /// disables the background sweep.
    pub fn new(default_ttl: Duration, sweep_interval: Duration) -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
            default_ttl,
            sweep_interval,
        }
    }

    /// Look up a live entry. Missing and expired entries are both misses.
    pub async fn get(&self, key: &str) -> Option<Joke> {
        let items = self.items.read().await;
        match items.get(key) {
            Some(entry) if !entry.is_expired(Instant::now()) => Some(entry.value.clone()),
            _ => None,
        }
    }

    /// Store `value` under `key`, replacing any previous entry.
    ///
    /// A zero `ttl` means the cache default.
    pub async fn set(&self, key: impl Into<String>, value: Joke, ttl: Duration) {
        let ttl = if ttl.is_zero() { self.default_ttl } else { ttl };
        let expires_at = (!ttl.is_zero()).then(|| Instant::now() + ttl);

        self.items
            .write()
            .await
            .insert(key.into(), CacheEntry { value, expires_at });
    }

    /// Remove expired entries, returning how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|_, entry| !entry.is_expired(now));
        before - items.len()
    }

    /// Number of stored entries, expired ones included.
    pub async fn entry_count(&self) -> usize {
        self.items.read().await.len()
    }

    /// Start the periodic expiry sweep. Returns `None` when sweeping is disabled.
    pub fn spawn_sweeper(self: Arc<Self>) -> Option<JoinHandle<()>> {
        if self.sweep_interval.is_zero() {
            return None;
        }

        let interval = self.sweep_interval;
        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = self.purge_expired().await;
                if removed > 0 {
                    let remaining = self.entry_count().await;
                    tracing::debug!(removed, remaining, "Swept expired cache entries");
                }
            }
        }))
    }
}
