use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;
use crate::validation::ValidationError;

/// Message returned for every lookup that does not resolve to a product.
pub const PRODUCT_NOT_FOUND: &str = "Product not found";

/// Message returned when no route matches the request.
pub const ROUTE_NOT_FOUND: &str = "Route not found";

/// Message returned for authentication failures.
pub const UNAUTHORIZED: &str = "Unauthorized: Invalid or missing API key";

/// Generic message for failures the client cannot act on.
pub const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

/// Application-wide error types with appropriate HTTP status codes.
///
/// Client errors (401, 400, 404) carry a message that is safe to return
/// verbatim. Everything else renders as a 500 with a generic message; the
/// full error is logged server-side and attached to the response as an
/// [`ErrorReport`] so development builds can expose it.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unauthorized: Invalid or missing API key")]
    Unauthorized,

    #[error("Validation Error: {0}")]
    Validation(#[from] ValidationError),

    #[error("{message}")]
    Payload { status: StatusCode, message: String },

    #[error("{0}")]
    NotFound(String),

    #[error("Store operation failed: {0}")]
    Store(#[from] StoreError),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// The not-found error used for unknown and malformed product ids.
    pub fn product_not_found() -> Self {
        Self::NotFound(PRODUCT_NOT_FOUND.to_string())
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Payload { status, .. } => *status,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Store(StoreError::MalformedId(_)) => StatusCode::NOT_FOUND,
            AppError::Store(StoreError::Rejected(_)) => StatusCode::BAD_REQUEST,
            AppError::Store(_) | AppError::Internal(_) | AppError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to send to the client.
    fn public_message(&self) -> String {
        match self {
            AppError::Store(StoreError::MalformedId(_)) => PRODUCT_NOT_FOUND.to_string(),
            AppError::Store(StoreError::Rejected(msg)) => msg.clone(),
            AppError::Store(_) | AppError::Internal(_) | AppError::Config(_) => {
                INTERNAL_SERVER_ERROR.to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Error response body for API endpoints.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

/// Diagnostic detail attached to server-error responses.
///
/// Stored in the response extensions; the error rendering middleware
/// decides whether it reaches the client.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub message: String,
    pub stack: String,
}

impl ErrorReport {
    /// Build a report from an error and its full source chain.
    pub fn from_error(err: &(dyn std::error::Error + 'static), message: String) -> Self {
        let mut stack = format!("{err:?}");
        let mut source = err.source();
        while let Some(cause) = source {
            stack.push_str("\n  caused by: ");
            stack.push_str(&cause.to_string());
            source = cause.source();
        }
        Self { message, stack }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.public_message();

        if status.is_server_error() {
            tracing::error!(error = %self, debug = ?self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let mut response = (
            status,
            Json(ErrorBody {
                message: message.clone(),
                stack: None,
            }),
        )
            .into_response();

        if status.is_server_error() {
            response
                .extensions_mut()
                .insert(ErrorReport::from_error(&self, message));
        }

        response
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
