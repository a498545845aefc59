//! Coordinator counters

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Point-in-time copy of the coordinator counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServiceStats {
    /// Listing reads answered without querying the store
    pub cache_hits: u64,
    /// Listing reads that found no snapshot and rebuilt it
    pub cache_misses: u64,
    /// Hits served by a rebuild another reader ran
    pub coalesced_reads: u64,
    /// Full-collection store queries, from cache misses or uncached reads
    pub store_queries: u64,
    pub invalidations: u64,
    pub failed_invalidations: u64,
    /// Snapshot write-backs undone because a write raced the rebuild
    pub skipped_populates: u64,
    /// Snapshot write-backs the cache refused
    pub failed_populates: u64,
}

impl ServiceStats {
    /// Returns hits / (hits + misses), or 0.0 if no cached reads happened.
    pub fn hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    coalesced_reads: AtomicU64,
    store_queries: AtomicU64,
    invalidations: AtomicU64,
    failed_invalidations: AtomicU64,
    skipped_populates: AtomicU64,
    failed_populates: AtomicU64,
}

impl Counters {
    pub(crate) fn record_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_coalesced_read(&self) {
        self.coalesced_reads.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_store_query(&self) {
        self.store_queries.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_invalidation(&self) {
        self.invalidations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed_invalidation(&self) {
        self.failed_invalidations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_skipped_populate(&self) {
        self.skipped_populates.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed_populate(&self) {
        self.failed_populates.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> ServiceStats {
        ServiceStats {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            coalesced_reads: self.coalesced_reads.load(Ordering::Relaxed),
            store_queries: self.store_queries.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
            failed_invalidations: self.failed_invalidations.load(Ordering::Relaxed),
            skipped_populates: self.skipped_populates.load(Ordering::Relaxed),
            failed_populates: self.failed_populates.load(Ordering::Relaxed),
        }
    }
}
