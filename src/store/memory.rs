//! In-memory record store

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{RecipeStore, StoreError};
use crate::models::{Recipe, RecipeId};

// == Collection ==
/// Insertion-ordered document collection shared by the store implementations.
#[derive(Debug, Clone, Default)]
pub(crate) struct Collection {
    docs: HashMap<RecipeId, Recipe>,
    order: Vec<RecipeId>,
}

impl Collection {
    pub(crate) fn from_documents(recipes: Vec<Recipe>) -> Result<Self, StoreError> {
        let mut collection = Self::default();
        for recipe in recipes {
            collection.insert(recipe)?;
        }
        Ok(collection)
    }

    pub(crate) fn insert(&mut self, recipe: Recipe) -> Result<(), StoreError> {
        if self.docs.contains_key(&recipe.id) {
            return Err(StoreError::Duplicate(recipe.id.to_string()));
        }
        self.order.push(recipe.id);
        self.docs.insert(recipe.id, recipe);
        Ok(())
    }

    pub(crate) fn all(&self) -> Vec<Recipe> {
        self.order
            .iter()
            .filter_map(|id| self.docs.get(id))
            .cloned()
            .collect()
    }

    pub(crate) fn get(&self, id: &RecipeId) -> Option<&Recipe> {
        self.docs.get(id)
    }

    pub(crate) fn replace(&mut self, id: RecipeId, mut recipe: Recipe) -> Result<(), StoreError> {
        let slot = self
            .docs
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        // The id is part of the document's identity and never changes
        recipe.id = id;
        *slot = recipe;
        Ok(())
    }

    pub(crate) fn remove(&mut self, id: &RecipeId) -> Result<(), StoreError> {
        if self.docs.remove(id).is_none() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.order.retain(|existing| existing != id);
        Ok(())
    }

    pub(crate) fn len(&self) -> usize {
        self.docs.len()
    }
}

// == Memory Store ==
/// Volatile store for tests and single-process deployments without a data file.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collection: RwLock<Collection>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `recipes`.
    pub fn with_recipes(recipes: Vec<Recipe>) -> Result<Self, StoreError> {
        Ok(Self {
            collection: RwLock::new(Collection::from_documents(recipes)?),
        })
    }

    pub async fn len(&self) -> usize {
        self.collection.read().await.len()
    }
}

#[async_trait]
impl RecipeStore for MemoryStore {
    async fn insert(&self, recipe: Recipe) -> Result<(), StoreError> {
        self.collection.write().await.insert(recipe)
    }

    async fn find_all(&self) -> Result<Vec<Recipe>, StoreError> {
        Ok(self.collection.read().await.all())
    }

    async fn find_by_id(&self, id: RecipeId) -> Result<Option<Recipe>, StoreError> {
        Ok(self.collection.read().await.get(&id).cloned())
    }

    async fn replace(&self, id: RecipeId, recipe: Recipe) -> Result<(), StoreError> {
        self.collection.write().await.replace(id, recipe)
    }

    async fn delete_by_id(&self, id: RecipeId) -> Result<(), StoreError> {
        self.collection.write().await.remove(&id)
    }
}
