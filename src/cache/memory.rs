//! In-process cache layer
//!
//! HashMap-backed key-value store with lazy TTL expiry. Suitable for a single
//! service instance; all state is lost on restart, which the listing cache
//! tolerates because its contents are derived from the record store.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::trace;

use super::{CacheEntry, CacheError, CacheLayer, CacheStats, MAX_KEY_LENGTH, MAX_VALUE_SIZE};

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, CacheEntry>,
    stats: CacheStats,
}

// == Memory Cache ==
/// Thread-safe in-memory cache.
#[derive(Debug, Default)]
pub struct MemoryCache {
    inner: RwLock<Inner>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl MemoryCache {
    /// Returns true if a live entry exists for `key`. Does not touch stats.
    pub(crate) async fn contains(&self, key: &str) -> bool {
        let inner = self.inner.read().await;
        inner
            .entries
            .get(key)
            .map(|entry| !entry.is_expired())
            .unwrap_or(false)
    }
}

#[async_trait]
impl CacheLayer for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        // Write lock: a lookup may drop an expired entry and always updates stats
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        let expired = match inner.entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                let value = entry.value.clone();
                inner.stats.hits += 1;
                return Ok(Some(value));
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            inner.entries.remove(key);
            inner.stats.expirations += 1;
            trace!(key, "dropped expired cache entry");
        }
        inner.stats.misses += 1;
        Ok(None)
    }

    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        if key.is_empty() || key.len() > MAX_KEY_LENGTH {
            return Err(CacheError::Rejected(format!(
                "key must be 1..={} bytes",
                MAX_KEY_LENGTH
            )));
        }
        if value.len() > MAX_VALUE_SIZE {
            return Err(CacheError::Rejected(format!(
                "value exceeds maximum size of {} bytes",
                MAX_VALUE_SIZE
            )));
        }

        let mut inner = self.inner.write().await;
        inner
            .entries
            .insert(key.to_string(), CacheEntry::new(value, ttl));
        inner.stats.writes += 1;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut inner = self.inner.write().await;
        if inner.entries.remove(key).is_some() {
            inner.stats.deletes += 1;
        }
        Ok(())
    }

    async fn stats(&self) -> Option<CacheStats> {
        let inner = self.inner.read().await;
        Some(CacheStats {
            entries: inner.entries.len(),
            ..inner.stats.clone()
        })
    }
}
