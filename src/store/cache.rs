//! Short-TTL Lookup Cache
//!
//! A small async cache fronting schema and table-listing lookups so that a
//! dashboard refresh with many panels does not hammer the store's metadata
//! endpoints. Entries are stamped on insert and checked on read; expired
//! entries are treated as absent and overwritten by the next fill.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

struct CachedEntry<V> {
    value: V,
    inserted_at: Instant,
}

impl<V> CachedEntry<V> {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() >= ttl
    }
}

/// String-keyed cache with a fixed time-to-live
pub struct TtlCache<V> {
    entries: Mutex<HashMap<String, CachedEntry<V>>>,
    ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    /// Create a cache with the given time-to-live
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Get a live entry, if present
    pub async fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.lock().await;
        let entry = entries.get(key)?;
        if entry.is_expired(self.ttl) {
            return None;
        }
        Some(entry.value.clone())
    }

    /// Insert or refresh an entry
    pub async fn put(&self, key: impl Into<String>, value: V) {
        let mut entries = self.entries.lock().await;
        entries.insert(
            key.into(),
            CachedEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Drop an entry
    pub async fn invalidate(&self, key: &str) {
        let mut entries = self.entries.lock().await;
        entries.remove(key);
    }

    /// Drop everything
    pub async fn clear(&self) {
        let mut entries = self.entries.lock().await;
        entries.clear();
    }

    /// Number of entries, live or expired
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether the cache holds no entries
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
