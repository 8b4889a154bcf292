//! Fuzz testing for validation functions.
//!
//! Feeds arbitrary bytes to the product payload validator and the
//! pagination parser. Both must return a `Result` for every input and
//! never panic.
//!
//! # Running the Fuzz Tests
//!
//! ```bash
//! cargo +nightly install cargo-fuzz
//!
//! cargo +nightly fuzz run fuzz_validation
//!
//! # With a time limit
//! cargo +nightly fuzz run fuzz_validation -- -max_total_time=60
//! ```
//!
//! # What This Tests
//!
//! - `validate_product`: any JSON object, including huge or exotic numbers
//! - `parse_positive`: `page` / `limit` query values

#![no_main]

use libfuzzer_sys::fuzz_target;
use product_api::models::ProductPayload;
use product_api::validation::{parse_positive, validate_product};
use rust_decimal::Decimal;

fuzz_target!(|data: &[u8]| {
    if let Ok(payload) = serde_json::from_slice::<ProductPayload>(data)
        && let Ok(input) = validate_product(&payload)
    {
        assert!(input.price > Decimal::ZERO);
    }

    if let Ok(s) = std::str::from_utf8(data) {
        let _ = parse_positive("page", Some(s), 1);
        if let Ok(limit) = parse_positive("limit", Some(s), 10) {
            assert!(limit >= 1);
        }
    }
});
