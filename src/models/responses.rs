//! Response DTOs for the recipes API
//!
//! Defines the structure of outgoing HTTP response bodies. Recipes themselves
//! are returned as-is.

use serde::Serialize;

use super::recipe::RecipeId;
use crate::cache::CacheStats;
use crate::service::ServiceStats;

/// Response body for DELETE /recipes/:id
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The id of the deleted recipe
    pub id: RecipeId,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(id: RecipeId) -> Self {
        Self {
            message: "Recipe has been deleted".to_string(),
            id,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Whether a cache layer is configured
    pub cache_enabled: bool,
    /// Listing reads answered without querying the store
    pub cache_hits: u64,
    /// Listing reads that found no snapshot
    pub cache_misses: u64,
    /// Hits served by a rebuild another reader ran
    pub coalesced_reads: u64,
    /// Full-collection store queries
    pub store_queries: u64,
    /// Successful snapshot invalidations
    pub invalidations: u64,
    /// Invalidations that failed after a successful write
    pub failed_invalidations: u64,
    /// Snapshot write-backs skipped because a write raced the rebuild
    pub skipped_populates: u64,
    /// Snapshot write-backs the cache refused
    pub failed_populates: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// The cache layer's own counters, when it keeps them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheStats>,
}

impl StatsResponse {
    /// Creates a new StatsResponse from coordinator and cache counters
    pub fn new(cache_enabled: bool, stats: &ServiceStats, cache: Option<CacheStats>) -> Self {
        Self {
            cache_enabled,
            cache_hits: stats.cache_hits,
            cache_misses: stats.cache_misses,
            coalesced_reads: stats.coalesced_reads,
            store_queries: stats.store_queries,
            invalidations: stats.invalidations,
            failed_invalidations: stats.failed_invalidations,
            skipped_populates: stats.skipped_populates,
            failed_populates: stats.failed_populates,
            hit_rate: stats.hit_rate(),
            cache,
        }
    }
}

/// Response body for the health check endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
