//! API Module
//!
//! HTTP handlers and routing for the recipes REST API. Handlers are thin: each
//! parses its input and makes one coordinator call.

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
