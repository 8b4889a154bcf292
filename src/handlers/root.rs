//! Routes outside the product resource.

use tracing::instrument;

use crate::error::{AppError, ROUTE_NOT_FOUND};

/// Plain-text greeting served at `/`.
pub const WELCOME_MESSAGE: &str =
    "Welcome to the Product API! Go to /api/products to see all products.";

/// `GET /`
#[instrument]
pub async fn welcome() -> &'static str {
    WELCOME_MESSAGE
}

/// Fallback for unknown paths and unsupported methods.
#[instrument]
pub async fn route_not_found() -> AppError {
    AppError::NotFound(ROUTE_NOT_FOUND.to_string())
}
