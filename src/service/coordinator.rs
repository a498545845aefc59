//! Read/Write Coordinator
//!
//! Mediates every list-read and mutation between the record store and the
//! listing cache.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::flight::{Flights, Follower, Role};
use super::options::{ReadFallback, ServiceOptions};
use super::stats::{Counters, ServiceStats};
use crate::cache::{CacheLayer, CacheStats, LISTING_KEY};
use crate::error::{Result, ServiceError};
use crate::models::{next_published_at, Recipe, RecipeDraft, RecipeId, RecipePatch};
use crate::store::RecipeStore;

// == Recipe Service ==
/// Cache-aside coordinator for recipe records.
///
/// Constructed once at startup and shared by every request handler. The only
/// in-process state is bookkeeping: counters, the invalidation generation and
/// the rebuild in flight. Store and cache calls are never made while holding
/// a lock.
pub struct RecipeService {
    store: Arc<dyn RecipeStore>,
    cache: Option<Arc<dyn CacheLayer>>,
    options: ServiceOptions,
    counters: Counters,
    /// Bumped before every snapshot invalidation
    generation: AtomicU64,
    /// Single-flight tracker for rebuilding the listing snapshot
    flights: Flights,
}

impl RecipeService {
    // == Constructor ==
    pub fn new(
        store: Arc<dyn RecipeStore>,
        cache: Option<Arc<dyn CacheLayer>>,
        options: ServiceOptions,
    ) -> Self {
        Self {
            store,
            cache,
            options,
            counters: Counters::default(),
            generation: AtomicU64::new(0),
            flights: Flights::default(),
        }
    }

    /// Returns true if list-reads go through a cache layer.
    pub fn cache_enabled(&self) -> bool {
        self.cache.is_some()
    }

    pub fn stats(&self) -> ServiceStats {
        self.counters.snapshot()
    }

    /// Counters kept by the cache layer itself, if it keeps any.
    pub async fn cache_stats(&self) -> Option<CacheStats> {
        match &self.cache {
            Some(cache) => cache.stats().await,
            None => None,
        }
    }

    // == List ==
    /// Returns every stored recipe.
    ///
    /// Served from the cached snapshot when present; otherwise the store is
    /// queried and the snapshot repopulated. Concurrent misses share one
    /// rebuild. A cache failure is handled according to [`ReadFallback`].
    pub async fn list(&self) -> Result<Vec<Recipe>> {
        let Some(cache) = &self.cache else {
            return self.query_store().await;
        };

        match self.probe(cache.as_ref()).await {
            Ok(Some(recipes)) => {
                self.counters.record_hit();
                debug!("Serving {} recipes from cache", recipes.len());
                return Ok(recipes);
            }
            Ok(None) => {}
            Err(err) => return self.degrade(err).await,
        }

        if !self.options.coalesce_misses {
            self.counters.record_miss();
            return self.repopulate(cache.as_ref()).await;
        }

        match self.flights.join() {
            Role::Leader(leader) => {
                self.counters.record_miss();
                let outcome = self.repopulate(cache.as_ref()).await;
                leader.finish(&outcome);
                outcome
            }
            Role::Follower(follower) => self.follow(follower, cache.as_ref()).await,
        }
    }

    // == Get One ==
    /// Reads a single recipe straight from the store.
    pub async fn get_one(&self, id: RecipeId) -> Result<Recipe> {
        self.bounded("store find_by_id", self.store.find_by_id(id))
            .await?
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))
    }

    // == Create ==
    pub async fn create(&self, draft: RecipeDraft) -> Result<Recipe> {
        if let Some(message) = draft.validate() {
            return Err(ServiceError::Validation(message));
        }

        let recipe = Recipe {
            id: RecipeId::new(),
            name: draft.name,
            tags: draft.tags,
            ingredients: draft.ingredients,
            instructions: draft.instructions,
            published_at: next_published_at(None),
        };

        self.persist("store insert", self.store.insert(recipe.clone()))
            .await?;
        info!("Created recipe {}", recipe.id);
        Ok(recipe)
    }

    // == Update ==
    /// Replaces all mutable fields of a recipe with the draft's. Fields the
    /// draft omits are cleared.
    pub async fn update(&self, id: RecipeId, draft: RecipeDraft) -> Result<Recipe> {
        if let Some(message) = draft.validate() {
            return Err(ServiceError::Validation(message));
        }

        let existing = self.get_one(id).await?;
        let recipe = Recipe {
            id,
            name: draft.name,
            tags: draft.tags,
            ingredients: draft.ingredients,
            instructions: draft.instructions,
            published_at: next_published_at(Some(existing.published_at)),
        };

        self.persist("store replace", self.store.replace(id, recipe.clone()))
            .await?;
        info!("Updated recipe {}", id);
        Ok(recipe)
    }

    // == Patch ==
    /// Applies a partial update: omitted fields are kept, `null` clears.
    pub async fn patch(&self, id: RecipeId, patch: RecipePatch) -> Result<Recipe> {
        if let Some(message) = patch.validate() {
            return Err(ServiceError::Validation(message));
        }

        let mut recipe = self.get_one(id).await?;
        let previous = recipe.published_at;
        patch.apply_to(&mut recipe);
        recipe.published_at = next_published_at(Some(previous));

        self.persist("store replace", self.store.replace(id, recipe.clone()))
            .await?;
        info!("Patched recipe {}", id);
        Ok(recipe)
    }

    // == Delete ==
    pub async fn delete(&self, id: RecipeId) -> Result<()> {
        self.persist("store delete_by_id", self.store.delete_by_id(id))
            .await?;
        info!("Deleted recipe {}", id);
        Ok(())
    }

    // == Internals ==

    /// Runs a downstream call under the configured deadline.
    async fn bounded<T, E, F>(&self, operation: &'static str, call: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, E>>,
        ServiceError: From<E>,
    {
        let deadline = self.options.operation_timeout;
        match tokio::time::timeout(deadline, call).await {
            Ok(result) => result.map_err(ServiceError::from),
            Err(_) => {
                warn!("{} exceeded deadline of {:?}", operation, deadline);
                Err(ServiceError::Timeout(format!(
                    "{} exceeded {:?}",
                    operation, deadline
                )))
            }
        }
    }

    /// Runs a store write and invalidates the snapshot afterwards.
    ///
    /// A write that timed out may still have been applied, so the snapshot is
    /// invalidated in that case too.
    async fn persist<F>(&self, operation: &'static str, write: F) -> Result<()>
    where
        F: Future<Output = std::result::Result<(), crate::store::StoreError>>,
    {
        let result = self.bounded(operation, write).await;
        if matches!(result, Ok(()) | Err(ServiceError::Timeout(_))) {
            self.invalidate().await;
        }
        result
    }

    /// Deletes the listing snapshot. Never fails the caller.
    async fn invalidate(&self) {
        let Some(cache) = &self.cache else {
            return;
        };

        self.generation.fetch_add(1, Ordering::AcqRel);
        match self
            .bounded("cache delete", cache.delete(LISTING_KEY))
            .await
        {
            Ok(()) => {
                self.counters.record_invalidation();
                debug!("Removed recipe listing from cache");
            }
            Err(err) => {
                self.counters.record_failed_invalidation();
                warn!(
                    "Failed to invalidate recipe listing, cached listing stays stale until the next invalidation: {}",
                    err
                );
            }
        }
    }

    /// Fetches and decodes the snapshot. `Ok(None)` is a clean miss.
    async fn probe(&self, cache: &dyn CacheLayer) -> Result<Option<Vec<Recipe>>> {
        let Some(bytes) = self.bounded("cache get", cache.get(LISTING_KEY)).await? else {
            return Ok(None);
        };

        match serde_json::from_slice(&bytes) {
            Ok(recipes) => Ok(Some(recipes)),
            Err(err) => {
                warn!("Discarding undecodable recipe listing snapshot: {}", err);
                if let Err(err) = self.bounded("cache delete", cache.delete(LISTING_KEY)).await {
                    warn!("Failed to discard recipe listing snapshot: {}", err);
                }
                Ok(None)
            }
        }
    }

    async fn query_store(&self) -> Result<Vec<Recipe>> {
        self.counters.record_store_query();
        debug!("Querying store for all recipes");
        self.bounded("store find_all", self.store.find_all()).await
    }

    /// Miss path: query the store and write the snapshot back.
    async fn repopulate(&self, cache: &dyn CacheLayer) -> Result<Vec<Recipe>> {
        let generation = self.generation.load(Ordering::Acquire);
        let recipes = self.query_store().await?;
        let bytes = serde_json::to_vec(&recipes)?;

        if self.generation.load(Ordering::Acquire) != generation {
            self.counters.record_skipped_populate();
            debug!("Recipe listing changed during rebuild, not caching it");
            return Ok(recipes);
        }

        // The listing is already in hand; failing to cache it only costs the
        // next reader a store query
        if let Err(err) = self
            .bounded("cache set", cache.set(LISTING_KEY, bytes, None))
            .await
        {
            self.counters.record_failed_populate();
            warn!("Failed to cache recipe listing, serving it uncached: {}", err);
            return Ok(recipes);
        }

        // An invalidation between the check above and the write may have
        // run before our write landed; drop the snapshot so it is not served.
        if self.generation.load(Ordering::Acquire) != generation {
            self.counters.record_skipped_populate();
            debug!("Recipe listing changed while caching it, dropping snapshot");
            if let Err(err) = self.bounded("cache delete", cache.delete(LISTING_KEY)).await {
                warn!("Failed to drop raced recipe listing snapshot: {}", err);
            }
        }

        Ok(recipes)
    }

    /// Waits, under the deadline, for the rebuild another reader leads.
    async fn follow(&self, follower: Follower, cache: &dyn CacheLayer) -> Result<Vec<Recipe>> {
        let deadline = self.options.operation_timeout;
        match tokio::time::timeout(deadline, follower.outcome()).await {
            Ok(Some(Ok(recipes))) => {
                self.counters.record_hit();
                self.counters.record_coalesced_read();
                debug!("Serving {} recipes from coalesced rebuild", recipes.len());
                Ok(recipes)
            }
            Ok(Some(Err(err))) => {
                self.counters.record_miss();
                Err(err)
            }
            Ok(None) => {
                debug!("Listing rebuild was abandoned, rebuilding it here");
                self.counters.record_miss();
                self.repopulate(cache).await
            }
            Err(_) => {
                self.counters.record_miss();
                warn!("Waiting for listing rebuild exceeded deadline of {:?}", deadline);
                Err(ServiceError::Timeout(format!(
                    "waiting for listing rebuild exceeded {:?}",
                    deadline
                )))
            }
        }
    }

    /// Handles a cache failure on the read path.
    async fn degrade(&self, err: ServiceError) -> Result<Vec<Recipe>> {
        match self.options.read_fallback {
            ReadFallback::FailFast => Err(err),
            ReadFallback::DegradeToStore => {
                warn!("Cache read failed, answering from store: {}", err);
                self.query_store().await
            }
        }
    }
}

impl std::fmt::Debug for RecipeService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipeService")
            .field("cache_enabled", &self.cache_enabled())
            .field("options", &self.options)
            .field("stats", &self.stats())
            .finish()
    }
}
