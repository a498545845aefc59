//! Recipes API - record service with a cache-aside listing cache
//!
//! Recipes live in a record store; the full listing is cached under one key
//! and invalidated on every write.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod store;

pub use api::AppState;
pub use config::Config;
pub use error::ServiceError;
pub use service::RecipeService;
