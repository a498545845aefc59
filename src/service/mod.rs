//! Service Module
//!
//! The read/write coordinator that sits between the HTTP layer, the record
//! store and the optional listing cache.
//!
//! # Consistency
//! - List-reads are cache-aside: a hit is served from the snapshot, a miss
//!   queries the store and writes the snapshot back without expiration.
//! - Every mutation writes the store first and then deletes the snapshot.
//!   Between those two steps a concurrent reader may still see the previous
//!   snapshot. A failed delete leaves the previous snapshot in place until the
//!   next successful invalidation; the failure is logged and counted.
//! - Concurrent misses share one rebuild. Followers wait for the leader's
//!   outcome under the same deadline as any other call, and a failed
//!   write-back never fails the read that produced the listing.

mod coordinator;
mod flight;
mod options;
mod stats;

#[cfg(test)]
pub(crate) mod test_support;

pub use coordinator::RecipeService;
pub use options::{ReadFallback, ServiceOptions};
pub use stats::ServiceStats;
