//! Record Store Module
//!
//! The durable source of truth for recipes. Stores are addressed by recipe id
//! and must make every single-document operation atomic.

mod file;
mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Recipe, RecipeId};

pub use file::FileStore;
pub use memory::MemoryStore;

// == Store Error ==
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No document with the given id
    #[error("no recipe with id {0}")]
    NotFound(String),

    /// A document with the given id already exists
    #[error("duplicate recipe id {0}")]
    Duplicate(String),

    /// Reading or writing the backing medium failed
    #[error("store I/O failed: {0}")]
    Io(String),

    /// The backing medium holds data that cannot be decoded
    #[error("store data is corrupt: {0}")]
    Corrupt(String),
}

// == Recipe Store ==
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Adds a new document. Fails with `Duplicate` if the id is taken.
    async fn insert(&self, recipe: Recipe) -> Result<(), StoreError>;

    /// Returns every document in insertion order.
    async fn find_all(&self) -> Result<Vec<Recipe>, StoreError>;

    async fn find_by_id(&self, id: RecipeId) -> Result<Option<Recipe>, StoreError>;

    /// Replaces the document stored under `id`. Fails with `NotFound` if absent.
    async fn replace(&self, id: RecipeId, recipe: Recipe) -> Result<(), StoreError>;

    /// Removes the document stored under `id`. Fails with `NotFound` if absent.
    async fn delete_by_id(&self, id: RecipeId) -> Result<(), StoreError>;
}
