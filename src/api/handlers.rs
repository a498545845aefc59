//! API Handlers
//!
//! HTTP request handlers mapping each endpoint onto one coordinator call.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use anyhow::Context;
use tracing::info;

use crate::cache::{CacheLayer, MemoryCache, RedisCache};
use crate::config::Config;
use crate::error::{Result, ServiceError};
use crate::models::{
    DeleteResponse, HealthResponse, Recipe, RecipeDraft, RecipeId, RecipePatch, StatsResponse,
};
use crate::service::RecipeService;
use crate::store::{FileStore, MemoryStore, RecipeStore};

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// The read/write coordinator
    pub service: Arc<RecipeService>,
}

impl AppState {
    /// Creates a new AppState around an existing coordinator.
    pub fn new(service: RecipeService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    /// Builds the store, the optional cache and the coordinator from
    /// configuration.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let store: Arc<dyn RecipeStore> = match &config.data_file {
            Some(path) => Arc::new(
                FileStore::open(path)
                    .await
                    .with_context(|| format!("Failed to open record store {}", path.display()))?,
            ),
            None => Arc::new(MemoryStore::new()),
        };
        let cache: Option<Arc<dyn CacheLayer>> = match (config.cache_enabled, &config.redis_url) {
            (false, _) => None,
            (true, Some(url)) => {
                info!("Using Redis listing cache");
                Some(Arc::new(
                    RedisCache::new(url).context("Failed to configure Redis cache")?,
                ))
            }
            (true, None) => Some(Arc::new(MemoryCache::new())),
        };

        Ok(Self::new(RecipeService::new(
            store,
            cache,
            config.service_options(),
        )))
    }
}

fn body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ServiceError::Validation(rejection.body_text()))
}

/// Handler for POST /recipes
pub async fn create_recipe_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RecipeDraft>, JsonRejection>,
) -> Result<Json<Recipe>> {
    let draft = body(payload)?;
    let recipe = state.service.create(draft).await?;
    Ok(Json(recipe))
}

/// Handler for GET /recipes
pub async fn list_recipes_handler(State(state): State<AppState>) -> Result<Json<Vec<Recipe>>> {
    Ok(Json(state.service.list().await?))
}

/// Handler for GET /recipes/:id
pub async fn get_recipe_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Recipe>> {
    let id: RecipeId = id.parse()?;
    Ok(Json(state.service.get_one(id).await?))
}

/// Handler for PUT /recipes/:id
///
/// Replaces every mutable field; omitted fields are cleared.
pub async fn update_recipe_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<RecipeDraft>, JsonRejection>,
) -> Result<Json<Recipe>> {
    let id: RecipeId = id.parse()?;
    let draft = body(payload)?;
    Ok(Json(state.service.update(id, draft).await?))
}

/// Handler for PATCH /recipes/:id
pub async fn patch_recipe_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<RecipePatch>, JsonRejection>,
) -> Result<Json<Recipe>> {
    let id: RecipeId = id.parse()?;
    let patch = body(payload)?;
    Ok(Json(state.service.patch(id, patch).await?))
}

/// Handler for DELETE /recipes/:id
pub async fn delete_recipe_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let id: RecipeId = id.parse()?;
    state.service.delete(id).await?;
    Ok(Json(DeleteResponse::new(id)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::new(
        state.service.cache_enabled(),
        &state.service.stats(),
        state.service.cache_stats().await,
    ))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
