//! Instrumented store and cache doubles for coordinator tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::{RecipeService, ServiceOptions};
use crate::cache::{CacheError, CacheLayer, CacheStats, MemoryCache};
use crate::models::{Recipe, RecipeId};
use crate::store::{MemoryStore, RecipeStore, StoreError};

/// Memory store that counts listing queries and can be slowed down or broken.
#[derive(Default)]
pub(crate) struct CountingStore {
    inner: MemoryStore,
    find_all_calls: AtomicUsize,
    delay_ms: AtomicUsize,
    list_delay_ms: AtomicUsize,
    fail_writes: AtomicBool,
}

impl CountingStore {
    pub(crate) fn find_all_calls(&self) -> usize {
        self.find_all_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn set_delay(&self, delay: Duration) {
        self.delay_ms
            .store(delay.as_millis() as usize, Ordering::SeqCst);
    }

    /// Delays `find_all` after it has read the collection, so the returned
    /// listing is as old as the delay.
    pub(crate) fn set_list_delay(&self, delay: Duration) {
        self.list_delay_ms
            .store(delay.as_millis() as usize, Ordering::SeqCst);
    }

    pub(crate) fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    async fn pause(&self) {
        let ms = self.delay_ms.load(Ordering::SeqCst);
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms as u64)).await;
        }
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(StoreError::Io("disk unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RecipeStore for CountingStore {
    async fn insert(&self, recipe: Recipe) -> Result<(), StoreError> {
        self.pause().await;
        self.check_writable()?;
        self.inner.insert(recipe).await
    }

    async fn find_all(&self) -> Result<Vec<Recipe>, StoreError> {
        self.find_all_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        let listing = self.inner.find_all().await;
        let ms = self.list_delay_ms.load(Ordering::SeqCst);
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms as u64)).await;
        }
        listing
    }

    async fn find_by_id(&self, id: RecipeId) -> Result<Option<Recipe>, StoreError> {
        self.pause().await;
        self.inner.find_by_id(id).await
    }

    async fn replace(&self, id: RecipeId, recipe: Recipe) -> Result<(), StoreError> {
        self.pause().await;
        self.check_writable()?;
        self.inner.replace(id, recipe).await
    }

    async fn delete_by_id(&self, id: RecipeId) -> Result<(), StoreError> {
        self.pause().await;
        self.check_writable()?;
        self.inner.delete_by_id(id).await
    }
}

/// Memory cache whose individual operations can be switched to fail.
#[derive(Default)]
pub(crate) struct FlakyCache {
    pub(crate) inner: MemoryCache,
    fail_get: AtomicBool,
    fail_set: AtomicBool,
    fail_delete: AtomicBool,
}

impl FlakyCache {
    pub(crate) fn fail_get(&self, fail: bool) {
        self.fail_get.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_set(&self, fail: bool) {
        self.fail_set.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    fn outage(flag: &AtomicBool) -> Result<(), CacheError> {
        if flag.load(Ordering::SeqCst) {
            Err(CacheError::Unavailable("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CacheLayer for FlakyCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Self::outage(&self.fail_get)?;
        self.inner.get(key).await
    }

    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        Self::outage(&self.fail_set)?;
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        Self::outage(&self.fail_delete)?;
        self.inner.delete(key).await
    }

    async fn stats(&self) -> Option<CacheStats> {
        self.inner.stats().await
    }
}

/// A coordinator wired to instrumented doubles.
pub(crate) struct Harness {
    pub(crate) store: Arc<CountingStore>,
    pub(crate) cache: Arc<FlakyCache>,
    pub(crate) service: RecipeService,
}

impl Harness {
    pub(crate) fn new(options: ServiceOptions) -> Self {
        let store = Arc::new(CountingStore::default());
        let cache = Arc::new(FlakyCache::default());
        let service = RecipeService::new(
            store.clone(),
            Some(cache.clone() as Arc<dyn CacheLayer>),
            options,
        );
        Self {
            store,
            cache,
            service,
        }
    }
}
