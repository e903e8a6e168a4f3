//! Endpoint handlers.
//!
//! `page` serves the HTML form; the rest are JSON. Handlers delegate to
//! `CoreState` and only translate between HTTP and domain types.

pub mod dataset;
pub mod health;
pub mod history;
pub mod page;
pub mod predict;

use axum::http::Uri;

use crate::api::error::ApiError;

/// Fallback for unknown routes.
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}
