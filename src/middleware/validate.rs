//! Product payload validation.
//!
//! [`ValidProduct`] is an extractor, so it runs after every route layer and
//! a guarded route checks the API key before the body is looked at.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use serde_json::Value;
use tracing::debug;

use crate::error::AppError;
use crate::models::{ProductInput, ProductPayload};
use crate::validation::{ValidationError, validate_product};

/// A create/update body that passed validation.
#[derive(Debug, Clone)]
pub struct ValidProduct(pub ProductInput);

impl<S> FromRequest<S> for ValidProduct
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<Value>::from_request(req, state)
            .await
            .map_err(rejection_to_error)?;

        let payload = parse_payload(body)?;
        let input = validate_product(&payload).inspect_err(|err| {
            debug!(reason = %err, "Product payload rejected");
        })?;

        Ok(Self(input))
    }
}

/// Turn an arbitrary JSON document into a payload.
///
/// Only objects are accepted; arrays would otherwise bind positionally.
fn parse_payload(body: Value) -> Result<ProductPayload, ValidationError> {
    match body {
        body @ Value::Object(_) => serde_json::from_value(body)
            .map_err(|e| ValidationError::MalformedRequest(e.to_string())),
        _ => Err(ValidationError::MalformedRequest(
            "request body must be a JSON object".to_string(),
        )),
    }
}

fn rejection_to_error(rejection: JsonRejection) -> AppError {
    match rejection {
        JsonRejection::JsonSyntaxError(_) => {
            ValidationError::MalformedRequest("malformed JSON in request body".to_string()).into()
        }
        JsonRejection::JsonDataError(_) => {
            ValidationError::MalformedRequest("request body must be a JSON object".to_string())
                .into()
        }
        JsonRejection::MissingJsonContentType(_) => {
            ValidationError::MalformedRequest("expected a JSON request body".to_string()).into()
        }
        // Body read failures, including the size limit.
        other => AppError::Payload {
            status: other.status(),
            message: other.body_text(),
        },
    }
}
