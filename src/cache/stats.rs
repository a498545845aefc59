//! Cache layer counters
//!
//! Reported by cache layers that keep their own bookkeeping and surfaced
//! under `cache` in `GET /stats`.

use serde::Serialize;

/// Point-in-time copy of a cache layer's counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups that found a live entry
    pub hits: u64,
    /// Lookups that found nothing or an expired entry
    pub misses: u64,
    /// Accepted writes
    pub writes: u64,
    /// Keys removed by an explicit delete
    pub deletes: u64,
    /// Entries dropped because their TTL elapsed
    pub expirations: u64,
    /// Entries held right now
    pub entries: usize,
}
