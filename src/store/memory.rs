//! In-process product collection.
//!
//! Documents live in an insertion-ordered map guarded by a single
//! `RwLock`; each trait call holds the lock for its whole duration, so
//! every operation is atomic with respect to one document and concurrent
//! updates are last-write-wins.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{Page, ProductFilter, ProductStore, StoreError, StoreResult, check_constraints};
use crate::models::{CategoryStats, NewProduct, Product, ProductInput};

/// In-memory [`ProductStore`] backend (`memory://`).
#[derive(Debug, Default)]
pub struct MemoryStore {
    products: RwLock<IndexMap<Uuid, Product>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn parse_id(id: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| StoreError::MalformedId(id.to_string()))
}

/// Timestamp for a write that must sort after `previous`.
fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + TimeDelta::microseconds(1)
    }
}

fn to_index(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn find(&self, filter: &ProductFilter, page: Page) -> StoreResult<Vec<Product>> {
        let products = self.products.read().await;
        Ok(products
            .values()
            .filter(|product| filter.matches(product))
            .skip(to_index(page.offset))
            .take(to_index(page.limit))
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &ProductFilter) -> StoreResult<u64> {
        let products = self.products.read().await;
        let count = products
            .values()
            .filter(|product| filter.matches(product))
            .count();
        Ok(count as u64)
    }

    async fn group_by_category(&self) -> StoreResult<Vec<CategoryStats>> {
        let products = self.products.read().await;

        let mut groups: BTreeMap<&str, (u64, Decimal)> = BTreeMap::new();
        for product in products.values() {
            let (count, total) = groups.entry(product.category.as_str()).or_default();
            *count += 1;
            *total = total
                .checked_add(product.price)
                .ok_or_else(|| StoreError::Overflow(product.category.clone()))?;
        }

        groups
            .into_iter()
            .map(|(category, (count, total_value))| -> StoreResult<CategoryStats> {
                let avg_price = total_value
                    .checked_div(Decimal::from(count))
                    .ok_or_else(|| StoreError::Overflow(category.to_string()))?;
                Ok(CategoryStats {
                    category: category.to_string(),
                    count,
                    avg_price,
                    total_value,
                })
            })
            .collect()
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Product>> {
        let id = parse_id(id)?;
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn insert(&self, product: NewProduct) -> StoreResult<Product> {
        check_constraints(
            &product.name,
            &product.description,
            product.price,
            &product.category,
        )?;

        let now = Utc::now();
        let stored = Product {
            id: Uuid::new_v4(),
            name: product.name,
            description: product.description,
            price: product.price,
            category: product.category,
            in_stock: product.in_stock,
            created_at: now,
            updated_at: now,
        };

        self.products.write().await.insert(stored.id, stored.clone());
        debug!(id = %stored.id, "Product inserted");
        Ok(stored)
    }

    async fn update_by_id(&self, id: &str, changes: ProductInput) -> StoreResult<Option<Product>> {
        let id = parse_id(id)?;
        check_constraints(
            &changes.name,
            &changes.description,
            changes.price,
            &changes.category,
        )?;

        let mut products = self.products.write().await;
        let Some(product) = products.get_mut(&id) else {
            return Ok(None);
        };

        product.name = changes.name;
        product.description = changes.description;
        product.price = changes.price;
        product.category = changes.category;
        if let Some(in_stock) = changes.in_stock {
            product.in_stock = in_stock;
        }
        product.updated_at = next_timestamp(product.updated_at);

        debug!(%id, "Product updated");
        Ok(Some(product.clone()))
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<Option<Product>> {
        let id = parse_id(id)?;
        let removed = self.products.write().await.shift_remove(&id);
        if removed.is_some() {
            debug!(%id, "Product deleted");
        }
        Ok(removed)
    }
}
