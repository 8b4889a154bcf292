//! Persistence gateway for the product collection.
//!
//! Handlers only see the [`ProductStore`] trait. Backends are selected by
//! the scheme of the `DATABASE_URL` connection string:
//!
//! | Scheme      | Backend                                   |
//! |-------------|-------------------------------------------|
//! | `memory://` | [`MemoryStore`], an in-process collection |
//!
//! Identifiers cross the trait boundary as the raw path segment so that
//! each backend decides what a well-formed id is. A segment the backend
//! cannot parse comes back as [`StoreError::MalformedId`].

mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::models::{CategoryStats, NewProduct, Product, ProductInput};

pub use memory::MemoryStore;

/// Errors reported by a store backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The identifier is not valid for this backend.
    #[error("malformed product id: {0}")]
    MalformedId(String),

    /// The document failed a store-level constraint.
    #[error("{0}")]
    Rejected(String),

    /// The backend could not complete the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Aggregation overflowed the numeric range of the store.
    #[error("aggregation overflow in category '{0}'")]
    Overflow(String),

    /// The connection string names a backend this build does not have.
    #[error("unsupported store backend '{0}'")]
    UnsupportedBackend(String),
}

/// Convenience type alias for store results.
pub type StoreResult<T> = Result<T, StoreError>;

/// Filter shared by find and count.
///
/// Unset clauses match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Exact match on `category`.
    pub category: Option<String>,
    /// Case-insensitive substring match on `name`.
    pub name_contains: Option<String>,
    /// Exact match on `in_stock`.
    pub in_stock: Option<bool>,
}

impl ProductFilter {
    /// Restrict to one category. Empty input leaves the filter unchanged.
    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category.filter(|c| !c.is_empty());
        self
    }

    /// Restrict to names containing `search`. Empty input leaves the filter unchanged.
    pub fn with_name_search(mut self, search: Option<String>) -> Self {
        self.name_contains = search.filter(|s| !s.is_empty()).map(|s| s.to_lowercase());
        self
    }

    /// Restrict to products with the given stock flag.
    pub fn with_in_stock(mut self, in_stock: bool) -> Self {
        self.in_stock = Some(in_stock);
        self
    }

    /// Whether `product` satisfies every clause of the filter.
    pub fn matches(&self, product: &Product) -> bool {
        self.category
            .as_ref()
            .is_none_or(|category| product.category == *category)
            && self
                .name_contains
                .as_ref()
                .is_none_or(|needle| product.name.to_lowercase().contains(needle.as_str()))
            && self.in_stock.is_none_or(|flag| product.in_stock == flag)
    }
}

/// Offset/limit window over a filtered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: u64,
    pub limit: u64,
}

impl Page {
    /// Window for a 1-based page number.
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            offset: page.saturating_sub(1).saturating_mul(limit),
            limit,
        }
    }
}

/// Operations the request handlers need from the product collection.
///
/// Results are returned in insertion order.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Products matching `filter`, restricted to `page`.
    async fn find(&self, filter: &ProductFilter, page: Page) -> StoreResult<Vec<Product>>;

    /// Number of products matching `filter`, ignoring pagination.
    async fn count(&self, filter: &ProductFilter) -> StoreResult<u64>;

    /// Count, average price and total value per category, sorted by category.
    async fn group_by_category(&self) -> StoreResult<Vec<CategoryStats>>;

    /// Look up one product. `Ok(None)` when the id is well-formed but unknown.
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Product>>;

    /// Store a new product, assigning its id and timestamps.
    async fn insert(&self, product: NewProduct) -> StoreResult<Product>;

    /// Apply `changes` and return the updated product.
    async fn update_by_id(&self, id: &str, changes: ProductInput) -> StoreResult<Option<Product>>;

    /// Remove a product and return its last state.
    async fn delete_by_id(&self, id: &str) -> StoreResult<Option<Product>>;
}

/// Open the store named by a connection string.
pub async fn connect(url: &str) -> StoreResult<Arc<dyn ProductStore>> {
    let scheme = url.split_once("://").map_or(url, |(scheme, _)| scheme);

    match scheme {
        "memory" => {
            info!("Using in-memory product store");
            Ok(Arc::new(MemoryStore::new()))
        }
        other => Err(StoreError::UnsupportedBackend(other.to_string())),
    }
}

/// Store-level field constraints, checked on every write.
fn check_constraints(
    name: &str,
    description: &str,
    price: rust_decimal::Decimal,
    category: &str,
) -> StoreResult<()> {
    let missing: Vec<&str> = [
        ("name", name),
        ("description", description),
        ("category", category),
    ]
    .into_iter()
    .filter(|(_, value)| value.is_empty())
    .map(|(field, _)| field)
    .collect();

    if !missing.is_empty() {
        return Err(StoreError::Rejected(format!(
            "Product validation failed: {} required",
            missing.join(", ")
        )));
    }

    if price <= rust_decimal::Decimal::ZERO {
        return Err(StoreError::Rejected(
            "Product validation failed: price must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn product(name: &str, category: &str, in_stock: bool) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: "test".to_string(),
            price: Decimal::from(5),
            category: category.to_string(),
            in_stock,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = ProductFilter::default();
        assert!(filter.matches(&product("Lamp", "lighting", false)));
    }

    #[test]
    fn test_empty_strings_do_not_filter() {
        let filter = ProductFilter::default()
            .with_category(Some(String::new()))
            .with_name_search(Some(String::new()));
        assert_eq!(filter, ProductFilter::default());
    }

    #[test]
    fn test_category_is_exact() {
        let filter = ProductFilter::default().with_category(Some("tools".to_string()));
        assert!(filter.matches(&product("Hammer", "tools", true)));
        assert!(!filter.matches(&product("Hammer", "Tools", true)));
        assert!(!filter.matches(&product("Hammer", "power-tools", true)));
    }

    #[test]
    fn test_name_search_is_case_insensitive_substring() {
        let filter = ProductFilter::default().with_name_search(Some("LAMP".to_string()));
        assert!(filter.matches(&product("Desk lamp", "lighting", true)));
        assert!(filter.matches(&product("Lampshade", "lighting", true)));
        assert!(!filter.matches(&product("Bulb", "lighting", true)));
    }

    #[test]
    fn test_name_search_is_literal() {
        let filter = ProductFilter::default().with_name_search(Some(".*".to_string()));
        assert!(!filter.matches(&product("Desk lamp", "lighting", true)));
        assert!(filter.matches(&product("Wildcard .* mug", "kitchen", true)));
    }

    #[test]
    fn test_in_stock_clause() {
        let filter = ProductFilter::default().with_in_stock(true);
        assert!(filter.matches(&product("A", "x", true)));
        assert!(!filter.matches(&product("B", "x", false)));
    }

    #[test]
    fn test_page_offsets() {
        assert_eq!(Page::new(1, 10), Page { offset: 0, limit: 10 });
        assert_eq!(Page::new(2, 5), Page { offset: 5, limit: 5 });
        assert_eq!(Page::new(u64::MAX, u64::MAX).offset, u64::MAX);
    }

    #[test]
    fn test_check_constraints() {
        assert!(check_constraints("a", "b", Decimal::ONE, "c").is_ok());
        assert!(matches!(
            check_constraints("", "b", Decimal::ONE, "c"),
            Err(StoreError::Rejected(_))
        ));
        assert!(matches!(
            check_constraints("a", "b", Decimal::ZERO, "c"),
            Err(StoreError::Rejected(_))
        ));
    }

    #[tokio::test]
    async fn test_connect_memory() {
        let store = connect("memory://").await.unwrap();
        assert_eq!(store.count(&ProductFilter::default()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_connect_unsupported_scheme() {
        let result = connect("mongodb://localhost:27017/products").await;
        assert!(matches!(result, Err(StoreError::UnsupportedBackend(s)) if s == "mongodb"));
    }
}
