//! Cache Module
//!
//! The cache layer seam with an in-process and a Redis-backed implementation.
//! The coordinator only needs single-key get/set/delete; a clean miss is
//! `Ok(None)` and is distinct from a cache failure.

mod entry;
mod memory;
mod redis;
mod stats;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use entry::CacheEntry;
pub use memory::MemoryCache;
pub use self::redis::RedisCache;
pub use stats::CacheStats;

// == Public Constants ==
/// Key under which the serialized listing snapshot is stored
pub const LISTING_KEY: &str = "recipes";

/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed value size in bytes
pub const MAX_VALUE_SIZE: usize = 16 * 1024 * 1024; // 16 MB

// == Cache Error ==
/// Failure of the cache layer itself. A missing key is not an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The cache could not be reached
    #[error("cache unreachable: {0}")]
    Unavailable(String),

    /// The cache rejected the operation
    #[error("cache rejected operation: {0}")]
    Rejected(String),
}

// == Cache Layer ==
/// Key-value side store used for the listing snapshot.
///
/// Implementations must make each single-key operation atomic.
#[async_trait]
pub trait CacheLayer: Send + Sync {
    /// Returns the bytes stored under `key`, or `None` on a clean miss.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Stores `value` under `key`. `ttl = None` means no expiration.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>)
        -> Result<(), CacheError>;

    /// Removes `key`. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Counters kept by the layer, `None` if it keeps none.
    async fn stats(&self) -> Option<CacheStats> {
        None
    }
}
