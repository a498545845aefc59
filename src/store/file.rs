//! File-backed record store
//!
//! Keeps the collection in memory and mirrors it to a JSON document on disk.
//! Every mutation rewrites the file through a temporary sibling and a rename,
//! so the file always holds either the previous or the new collection. A
//! mutation whose flush fails is not applied.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use super::memory::Collection;
use super::{RecipeStore, StoreError};
use crate::models::{Recipe, RecipeId};

#[derive(Debug)]
struct Shared {
    path: PathBuf,
    collection: RwLock<Collection>,
}

#[derive(Debug)]
pub struct FileStore {
    shared: Arc<Shared>,
}

impl FileStore {
    /// Opens the store at `path`, loading existing documents if the file
    /// exists. A missing file starts an empty collection.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let collection = match fs::read(&path).await {
            Ok(bytes) => {
                let recipes: Vec<Recipe> = serde_json::from_slice(&bytes)
                    .map_err(|e| StoreError::Corrupt(format!("{}: {}", path.display(), e)))?;
                Collection::from_documents(recipes)?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Collection::default(),
            Err(e) => return Err(StoreError::Io(format!("{}: {}", path.display(), e))),
        };

        info!(
            "Opened record store at {} with {} recipes",
            path.display(),
            collection.len()
        );

        Ok(Self {
            shared: Arc::new(Shared {
                path,
                collection: RwLock::new(collection),
            }),
        })
    }

    // == Mutate ==
    /// Applies `change` to a copy of the collection, flushes the copy and only
    /// then swaps it in. The write lock is held for the whole sequence so
    /// mutations are serialized.
    ///
    /// The commit runs on its own task: dropping the returned future (for
    /// example on a deadline) does not stop it between the rename and the
    /// swap, so memory and disk always agree.
    async fn mutate<F>(&self, change: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Collection) -> Result<(), StoreError> + Send + 'static,
    {
        let shared = Arc::clone(&self.shared);
        let commit = tokio::spawn(async move {
            let mut guard = shared.collection.write().await;
            let mut next = guard.clone();
            change(&mut next)?;
            shared.flush(&next).await?;
            *guard = next;
            Ok(())
        });

        commit
            .await
            .map_err(|e| StoreError::Io(format!("commit task failed: {}", e)))?
    }
}

impl Shared {
    async fn flush(&self, collection: &Collection) -> Result<(), StoreError> {
        let bytes =
            serde_json::to_vec(&collection.all()).map_err(|e| StoreError::Io(e.to_string()))?;

        let tmp = self
            .path
            .with_extension(format!("json.{}.tmp", Uuid::new_v4().simple()));
        if let Err(e) = write_synced(&tmp, &bytes).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(StoreError::Io(format!("{}: {}", tmp.display(), e)));
        }
        if let Err(e) = fs::rename(&tmp, &self.path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(StoreError::Io(format!("{}: {}", self.path.display(), e)));
        }

        debug!(
            "Flushed {} recipes ({} bytes) to {}",
            collection.len(),
            bytes.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Writes `bytes` to a fresh file at `path` and waits until they are on disk.
async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

#[async_trait]
impl RecipeStore for FileStore {
    async fn insert(&self, recipe: Recipe) -> Result<(), StoreError> {
        self.mutate(move |c| c.insert(recipe)).await
    }

    async fn find_all(&self) -> Result<Vec<Recipe>, StoreError> {
        Ok(self.shared.collection.read().await.all())
    }

    async fn find_by_id(&self, id: RecipeId) -> Result<Option<Recipe>, StoreError> {
        Ok(self.shared.collection.read().await.get(&id).cloned())
    }

    async fn replace(&self, id: RecipeId, recipe: Recipe) -> Result<(), StoreError> {
        self.mutate(move |c| c.replace(id, recipe)).await
    }

    async fn delete_by_id(&self, id: RecipeId) -> Result<(), StoreError> {
        self.mutate(move |c| c.remove(&id)).await
    }
}
