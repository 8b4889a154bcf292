//! Wire-format tests for the product models.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::str::FromStr;

use chrono::{TimeZone, Utc};
use product_api::models::{
    CategoryStats, DeleteProductResponse, Product, ProductListResponse, ProductPayload,
    ProductStatsResponse,
};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use uuid::Uuid;

fn sample_product() -> Product {
    let created = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
    Product {
        id: Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap(),
        name: "Desk Lamp".to_string(),
        description: "Warm white LED lamp".to_string(),
        price: Decimal::from_str("24.99").unwrap(),
        category: "lighting".to_string(),
        in_stock: true,
        created_at: created,
        updated_at: created,
    }
}

mod product_tests {
    use super::*;

    #[test]
    fn test_product_uses_camel_case_fields() {
        let value = serde_json::to_value(sample_product()).unwrap();
        let object = value.as_object().unwrap();

        let mut keys: Vec<_> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            [
                "category",
                "createdAt",
                "description",
                "id",
                "inStock",
                "name",
                "price",
                "updatedAt"
            ]
        );
    }

    #[test]
    fn test_product_price_is_a_json_number() {
        let value = serde_json::to_value(sample_product()).unwrap();
        assert_eq!(value["price"].as_f64(), Some(24.99));
    }

    #[test]
    fn test_product_id_and_timestamps_are_strings() {
        let value = serde_json::to_value(sample_product()).unwrap();
        assert_eq!(value["id"], "550e8400-e29b-41d4-a716-446655440000");
        assert!(
            value["createdAt"]
                .as_str()
                .unwrap()
                .starts_with("2024-01-15T10:30:00")
        );
    }

    #[test]
    fn test_product_deserializes_from_wire_format() {
        let product: Product = serde_json::from_value(json!({
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "name": "Desk Lamp",
            "description": "Warm white LED lamp",
            "price": 24.99,
            "category": "lighting",
            "inStock": true,
            "createdAt": "2024-01-15T10:30:00Z",
            "updatedAt": "2024-01-15T10:30:00Z"
        }))
        .unwrap();

        assert_eq!(product, sample_product());
    }
}

mod payload_tests {
    use super::*;

    #[test]
    fn test_payload_keeps_raw_values() {
        let payload: ProductPayload = serde_json::from_value(json!({
            "name": "Lamp",
            "price": "12.50",
            "inStock": "yes"
        }))
        .unwrap();

        assert_eq!(payload.price, Some(json!("12.50")));
        assert_eq!(payload.in_stock, Some(json!("yes")));
        assert!(payload.description.is_none());
        assert!(payload.category.is_none());
    }

    #[test]
    fn test_empty_object_payload() {
        let payload: ProductPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.name.is_none());
        assert!(payload.price.is_none());
    }
}

mod response_tests {
    use super::*;

    #[test]
    fn test_list_response_shape() {
        let response = ProductListResponse {
            products: vec![sample_product()],
            current_page: 2,
            total_pages: 3,
            total_products: 12,
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["currentPage"], 2);
        assert_eq!(value["totalPages"], 3);
        assert_eq!(value["totalProducts"], 12);
        assert_eq!(value["products"][0]["name"], "Desk Lamp");
    }

    #[test]
    fn test_stats_response_shape() {
        let response = ProductStatsResponse {
            total_products: 3,
            in_stock_count: 2,
            out_of_stock_count: 1,
            by_category: vec![CategoryStats {
                category: "A".to_string(),
                count: 3,
                avg_price: Decimal::from(20),
                total_value: Decimal::from(60),
            }],
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({
                "totalProducts": 3,
                "inStockCount": 2,
                "outOfStockCount": 1,
                "byCategory": [
                    { "category": "A", "count": 3, "avgPrice": 20.0, "totalValue": 60.0 }
                ]
            })
        );
    }

    #[test]
    fn test_delete_response_shape() {
        let response = DeleteProductResponse {
            message: "Product deleted successfully".to_string(),
            product: sample_product(),
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["message"], "Product deleted successfully");
        assert!(matches!(value["product"], Value::Object(_)));
    }
}
