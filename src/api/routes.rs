//! API Routes
//!
//! Configures the Axum router with all recipe endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    create_recipe_handler, delete_recipe_handler, get_recipe_handler, health_handler,
    list_recipes_handler, patch_recipe_handler, stats_handler, update_recipe_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `POST /recipes` - Create a recipe
/// - `GET /recipes` - List all recipes (cached)
/// - `GET /recipes/:id` - Fetch one recipe
/// - `PUT /recipes/:id` - Replace a recipe's fields
/// - `PATCH /recipes/:id` - Partially update a recipe
/// - `DELETE /recipes/:id` - Delete a recipe
/// - `GET /stats` - Coordinator counters
/// - `GET /health` - Health check endpoint
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/recipes",
            get(list_recipes_handler).post(create_recipe_handler),
        )
        .route(
            "/recipes/:id",
            get(get_recipe_handler)
                .put(update_recipe_handler)
                .patch(patch_recipe_handler)
                .delete(delete_recipe_handler),
        )
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
