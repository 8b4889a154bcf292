//! Product resource endpoints.
//!
//! # Endpoints
//!
//! - `GET    /api/products`       - Filtered, paginated list
//! - `GET    /api/products/stats` - Catalogue statistics
//! - `GET    /api/products/{id}`  - One product
//! - `POST   /api/products`       - Create (API key + validation)
//! - `PUT    /api/products/{id}`  - Update (API key + validation)
//! - `DELETE /api/products/{id}`  - Delete (API key)
//!
//! Unknown and malformed ids both answer 404 `Product not found`.

use axum::Json;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::error::{AppError, AppResult};
use crate::metrics;
use crate::middleware::ValidProduct;
use crate::models::{DeleteProductResponse, Product, ProductListResponse, ProductStatsResponse};
use crate::state::AppState;
use crate::store::{Page, ProductFilter};
use crate::validation::{DEFAULT_LIMIT, DEFAULT_PAGE, ValidationError, parse_positive};

/// Message returned with a deleted product.
pub const PRODUCT_DELETED: &str = "Product deleted successfully";

/// Query parameters for the list endpoint.
///
/// Kept as raw strings so that `page=abc` reaches our own validation
/// instead of failing deserialization.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// The `{id}` segment of a product route.
///
/// A segment that does not decode (`%FF`) names no product.
fn product_id(path: Result<Path<String>, PathRejection>) -> AppResult<String> {
    path.map(|Path(id)| id).map_err(|rejection| {
        debug!(reason = %rejection.body_text(), "Undecodable product id");
        AppError::product_not_found()
    })
}

/// List products matching the optional filters, one page at a time.
///
/// # Query Parameters
///
/// - `category` - exact category match
/// - `search` - case-insensitive substring of the name
/// - `page` - 1-based page number (default: 1)
/// - `limit` - page size (default: 10, capped at `MAX_PAGE_SIZE`)
#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> AppResult<Json<ProductListResponse>> {
    let Query(query) =
        query.map_err(|rejection| ValidationError::MalformedRequest(rejection.body_text()))?;

    let page = parse_positive("page", query.page.as_deref(), DEFAULT_PAGE)?;
    let limit = parse_positive("limit", query.limit.as_deref(), DEFAULT_LIMIT)?
        .min(state.config.max_page_size);

    let filter = ProductFilter::default()
        .with_category(query.category)
        .with_name_search(query.search);

    let total_products = state.store.count(&filter).await?;
    let products = state.store.find(&filter, Page::new(page, limit)).await?;

    Ok(Json(ProductListResponse {
        products,
        current_page: page,
        total_pages: total_products.div_ceil(limit),
        total_products,
    }))
}

/// Catalogue-wide counts and per-category aggregates.
#[instrument(skip(state))]
pub async fn product_stats(State(state): State<AppState>) -> AppResult<Json<ProductStatsResponse>> {
    let total_products = state.store.count(&ProductFilter::default()).await?;
    let in_stock_count = state
        .store
        .count(&ProductFilter::default().with_in_stock(true))
        .await?;
    let by_category = state.store.group_by_category().await?;

    Ok(Json(ProductStatsResponse {
        total_products,
        in_stock_count,
        out_of_stock_count: total_products.saturating_sub(in_stock_count),
        by_category,
    }))
}

/// Fetch one product.
#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> AppResult<Json<Product>> {
    let id = product_id(id)?;
    let product = state
        .store
        .find_by_id(&id)
        .await?
        .ok_or_else(AppError::product_not_found)?;

    Ok(Json(product))
}

/// Create a product. `inStock` defaults to `true`.
#[instrument(skip(state))]
pub async fn create_product(
    State(state): State<AppState>,
    ValidProduct(input): ValidProduct,
) -> AppResult<(StatusCode, Json<Product>)> {
    let product = state.store.insert(input.into_new_product()).await?;

    metrics::record_product_mutation("create");
    info!(id = %product.id, category = %product.category, "Product created");

    Ok((StatusCode::CREATED, Json(product)))
}

/// Replace a product's fields. `inStock` changes only when supplied.
#[instrument(skip(state))]
pub async fn update_product(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    ValidProduct(input): ValidProduct,
) -> AppResult<Json<Product>> {
    let id = product_id(id)?;
    let product = state
        .store
        .update_by_id(&id, input)
        .await?
        .ok_or_else(AppError::product_not_found)?;

    metrics::record_product_mutation("update");
    info!(id = %product.id, "Product updated");

    Ok(Json(product))
}

/// Delete a product and return its last state.
#[instrument(skip(state))]
pub async fn delete_product(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> AppResult<Json<DeleteProductResponse>> {
    let id = product_id(id)?;
    let product = state
        .store
        .delete_by_id(&id)
        .await?
        .ok_or_else(AppError::product_not_found)?;

    metrics::record_product_mutation("delete");
    info!(id = %product.id, "Product deleted");

    Ok(Json(DeleteProductResponse {
        message: PRODUCT_DELETED.to_string(),
        product,
    }))
}
