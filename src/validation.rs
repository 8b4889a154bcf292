//! Request validation as pure functions.
//!
//! Every function here takes already-parsed input and returns a typed
//! result; nothing touches the request or the store.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;
use thiserror::Error;

use crate::models::{ProductInput, ProductPayload};

// =============================================================================
// Pagination Constants
// =============================================================================

/// Page returned when the client does not ask for one.
pub const DEFAULT_PAGE: u64 = 1;

/// Page size used when the client does not ask for one.
pub const DEFAULT_LIMIT: u64 = 10;

/// Reasons a request payload or query is rejected.
///
/// `Display` renders the human-readable reason without the
/// `Validation Error:` prefix; the HTTP layer adds it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("name, description, price, and category are required")]
    MissingRequiredFields,

    #[error("price must be a positive number")]
    NonPositivePrice,

    #[error("price is out of range")]
    PriceOutOfRange,

    #[error("{field} must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    #[error("{0} must be a positive integer")]
    NotPositiveInteger(&'static str),

    #[error("{0}")]
    MalformedRequest(String),
}

/// Validate a product payload for create and update.
///
/// Rules are checked in order and the first failure wins:
///
/// 1. `name`, `description`, `price` and `category` must be present and
///    truthy (not null, empty, `0` or `false`).
/// 2. `price` must be a JSON number strictly greater than zero.
/// 3. Text fields must be strings and `inStock`, when given, a boolean.
pub fn validate_product(payload: &ProductPayload) -> Result<ProductInput, ValidationError> {
    let required = [
        &payload.name,
        &payload.description,
        &payload.price,
        &payload.category,
    ];
    if !required.iter().all(|field| is_present(field.as_ref())) {
        return Err(ValidationError::MissingRequiredFields);
    }

    let price = match &payload.price {
        Some(Value::Number(number)) => parse_price(number)?,
        _ => return Err(ValidationError::NonPositivePrice),
    };

    let in_stock = match &payload.in_stock {
        None | Some(Value::Null) => None,
        Some(Value::Bool(flag)) => Some(*flag),
        Some(_) => {
            return Err(ValidationError::InvalidField {
                field: "inStock",
                expected: "a boolean",
            });
        }
    };

    Ok(ProductInput {
        name: text_field(&payload.name, "name")?,
        description: text_field(&payload.description, "description")?,
        price,
        category: text_field(&payload.category, "category")?,
        in_stock,
    })
}

/// Parse an optional positive integer query parameter.
///
/// A missing or empty value yields `default`. Anything that is not an
/// integer `>= 1` is rejected.
pub fn parse_positive(
    name: &'static str,
    raw: Option<&str>,
    default: u64,
) -> Result<u64, ValidationError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => match value.parse::<u64>() {
            Ok(parsed) if parsed >= 1 => Ok(parsed),
            _ => Err(ValidationError::NotPositiveInteger(name)),
        },
    }
}

/// JavaScript-style truthiness for required fields.
fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

fn parse_price(number: &serde_json::Number) -> Result<Decimal, ValidationError> {
    let text = number.to_string();
    let price = Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| {
            if number.as_f64().is_some_and(|n| n <= 0.0) {
                ValidationError::NonPositivePrice
            } else {
                ValidationError::PriceOutOfRange
            }
        })?;

    if price <= Decimal::ZERO {
        return Err(ValidationError::NonPositivePrice);
    }
    Ok(price)
}

fn text_field(value: &Option<Value>, field: &'static str) -> Result<String, ValidationError> {
    match value {
        Some(Value::String(text)) => Ok(text.clone()),
        _ => Err(ValidationError::InvalidField {
            field,
            expected: "a string",
        }),
    }
}
