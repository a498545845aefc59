//! Error types for the recipes service
//!
//! `ServiceError` is the taxonomy surfaced by the coordinator and mapped to
//! HTTP status codes by the API layer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::cache::CacheError;
use crate::models::ErrorResponse;
use crate::store::StoreError;

// == Service Error Enum ==
/// Unified error type for coordinator operations.
///
/// Cloneable so one outcome of a coalesced listing rebuild can be handed to
/// every reader that waited on it.
#[derive(Error, Debug, Clone)]
pub enum ServiceError {
    /// Referenced recipe does not exist
    #[error("Recipe not found: {0}")]
    NotFound(String),

    /// Malformed draft, body or identifier
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Record store I/O failed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Cache layer failed for a reason other than a clean miss
    #[error("Cache unavailable: {0}")]
    CacheUnavailable(String),

    /// A downstream call exceeded its deadline
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Listing snapshot could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::Serialization(err.to_string())
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => ServiceError::NotFound(id),
            other => ServiceError::Persistence(other.to_string()),
        }
    }
}

impl From<CacheError> for ServiceError {
    fn from(err: CacheError) -> Self {
        ServiceError::CacheUnavailable(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Persistence(_)
            | ServiceError::CacheUnavailable(_)
            | ServiceError::Timeout(_)
            | ServiceError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the recipes service.
pub type Result<T> = std::result::Result<T, ServiceError>;
