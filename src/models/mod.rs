//! Data model and DTOs for the recipes API
//!
//! `Recipe` is the stored entity; the request and response modules define the
//! HTTP bodies around it.

pub mod recipe;
pub mod requests;
pub mod responses;

pub use recipe::{next_published_at, Recipe, RecipeId};
pub use requests::{RecipeDraft, RecipePatch};
pub use responses::{DeleteResponse, ErrorResponse, HealthResponse, StatsResponse};
