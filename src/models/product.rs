//! Product entity and the request/response shapes built around it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// A persisted product document.
///
/// `id`, `created_at` and `updated_at` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub category: String,
    pub in_stock: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw create/update body.
///
/// Every field is kept as an untyped JSON value so validation can tell a
/// missing field from one of the wrong type. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub category: Option<Value>,
    #[serde(default)]
    pub in_stock: Option<Value>,
}

/// A validated create/update payload.
///
/// `in_stock` stays optional: create defaults it to `true`, update leaves
/// the stored value alone.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub in_stock: Option<bool>,
}

impl ProductInput {
    /// Fields for a new document, with `in_stock` defaulted.
    pub fn into_new_product(self) -> NewProduct {
        NewProduct {
            name: self.name,
            description: self.description,
            price: self.price,
            category: self.category,
            in_stock: self.in_stock.unwrap_or(true),
        }
    }
}

/// Fields for a product that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub in_stock: bool,
}

/// One page of the product list.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListResponse {
    pub products: Vec<Product>,
    pub current_page: u64,
    pub total_pages: u64,
    pub total_products: u64,
}

/// Per-category aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    pub category: String,
    pub count: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub avg_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_value: Decimal,
}

/// Catalogue-wide statistics.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductStatsResponse {
    pub total_products: u64,
    pub in_stock_count: u64,
    pub out_of_stock_count: u64,
    pub by_category: Vec<CategoryStats>,
}

/// Body returned after a successful delete.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteProductResponse {
    pub message: String,
    pub product: Product,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn test_input_defaults_in_stock() {
        let input = ProductInput {
            name: "Hammer".to_string(),
            description: "Claw hammer".to_string(),
            price: Decimal::from(12),
            category: "tools".to_string(),
            in_stock: None,
        };
        assert!(input.into_new_product().in_stock);
    }

    #[test]
    fn test_input_keeps_explicit_in_stock() {
        let input = ProductInput {
            name: "Hammer".to_string(),
            description: "Claw hammer".to_string(),
            price: Decimal::from(12),
            category: "tools".to_string(),
            in_stock: Some(false),
        };
        assert!(!input.into_new_product().in_stock);
    }

    #[test]
    fn test_payload_ignores_unknown_fields() {
        let payload: ProductPayload = serde_json::from_value(json!({
            "name": "Hammer",
            "sku": "H-1",
            "inStock": true
        }))
        .unwrap();
        assert_eq!(payload.name, Some(json!("Hammer")));
        assert_eq!(payload.in_stock, Some(json!(true)));
        assert!(payload.price.is_none());
    }

    #[test]
    fn test_category_stats_serializes_numbers() {
        let stats = CategoryStats {
            category: "A".to_string(),
            count: 3,
            avg_price: Decimal::from(20),
            total_value: Decimal::from_str("60.5").unwrap(),
        };
        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["avgPrice"].as_f64(), Some(20.0));
        assert_eq!(value["totalValue"].as_f64(), Some(60.5));
    }
}
