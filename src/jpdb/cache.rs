//! Parse result cache
//!
//! In-memory cache of decoded parse results keyed by a digest of the
//! submitted text. Entries carry an expiry instant; expired entries are
//! dropped on lookup and a background task sweeps the rest periodically.
//! The cache is constructed once and shared by reference, and it is cleared
//! wholesale whenever a deck mutation may have changed card states.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tokio::time::{Duration, Instant};

use super::types::JpdbParseResult;

/// How long a parse result stays reusable.
const CACHE_TTL: Duration = Duration::from_secs(60 * 5);
/// Upper bound on live entries; least recently used entries fall out first.
const CACHE_CAPACITY: usize = 1000;
/// How often the background sweeper evicts expired entries.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Thread-safe parse cache
#[derive(Clone)]
pub struct ParseCache {
    entries: Arc<RwLock<LruCache<String, CacheEntry>>>,
}

#[derive(Clone)]
struct CacheEntry {
    result: Arc<JpdbParseResult>,
    expires_at: Instant,
}

impl Default for ParseCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ParseCache {
    pub fn new() -> Self {
        Self::with_capacity(CACHE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity =
            NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(CACHE_CAPACITY).unwrap());
        Self {
            entries: Arc::new(RwLock::new(LruCache::new(capacity))),
        }
    }

    /// Cache key for a text input.
    pub fn key_for(text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Look up a live entry. Needs the write lock so the LRU order updates
    /// and an expired entry can be dropped on the spot.
    pub async fn get(&self, key: &str) -> Option<Arc<JpdbParseResult>> {
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.result.clone()),
            Some(_) => {
                entries.pop(key);
                None
            }
            None => None,
        }
    }

    pub async fn insert(&self, key: String, result: JpdbParseResult) -> Arc<JpdbParseResult> {
        let result = Arc::new(result);
        let entry = CacheEntry {
            result: result.clone(),
            expires_at: Instant::now() + CACHE_TTL,
        };
        self.entries.write().await.put(key, entry);
        result
    }

    /// Drop every entry. Called after deck mutations, which may invalidate
    /// the card states baked into stored results.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Evict expired entries, returning how many were dropped.
    pub async fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| entry.expires_at <= now)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            entries.pop(key);
        }
        expired.len()
    }

    /// Start the periodic sweep task for this cache.
    pub fn spawn_sweeper(&self) -> tokio::task::JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SWEEP_INTERVAL);
            loop {
                interval.tick().await;
                let removed = cache.sweep_expired().await;
                if removed > 0 {
                    tracing::debug!(removed, "swept expired parse results");
                }
            }
        })
    }
}
