//! API key authentication middleware.
//!
//! # Security Features
//!
//! - **Constant-time comparison**: Prevents timing attacks on API key validation
//! - **Header only**: The key is read from `x-api-key`, never from the URL
//! - **Fail closed**: With no secret configured every guarded request is rejected
//!
//! # Usage
//!
//! ```bash
//! API_KEY=your-secret-key cargo run
//!
//! curl -X DELETE -H "x-api-key: your-secret-key" \
//!     http://localhost:3000/api/products/<id>
//! ```
//!
//! The layer is attached per route with `route_layer`, so only the
//! mutating endpoints are guarded.

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{HeaderValue, Request, Response};
use axum::response::IntoResponse;
use subtle::ConstantTimeEq;
use tower::{Layer, Service};
use tracing::{debug, warn};

use crate::error::AppError;
use crate::metrics;

/// Header name for API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// API key authentication layer.
#[derive(Clone)]
pub struct ApiKeyAuth {
    /// Expected API key (None = every request is rejected)
    expected_key: Option<Arc<str>>,
}

impl ApiKeyAuth {
    /// Create a new API key auth layer.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Expected API key, or `None` to reject every request
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            expected_key: api_key.filter(|k| !k.is_empty()).map(Arc::from),
        }
    }

    /// Check whether a secret is configured.
    pub fn has_secret(&self) -> bool {
        self.expected_key.is_some()
    }
}

impl<S> Layer<S> for ApiKeyAuth {
    type Service = ApiKeyAuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ApiKeyAuthService {
            inner,
            expected_key: self.expected_key.clone(),
        }
    }
}

/// API key authentication service wrapper.
#[derive(Clone)]
pub struct ApiKeyAuthService<S> {
    inner: S,
    expected_key: Option<Arc<str>>,
}

impl<S> Service<Request<Body>> for ApiKeyAuthService<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let outcome = check_api_key(
            self.expected_key.as_deref(),
            req.headers().get(API_KEY_HEADER),
        );

        // Take the service that was driven to readiness, leave a clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            match outcome {
                AuthOutcome::Granted => {
                    debug!("API key authentication successful");
                    inner.call(req).await
                }
                rejected => {
                    metrics::record_auth_failure(rejected.reason());
                    warn!(
                        method = %req.method(),
                        path = %req.uri().path(),
                        reason = rejected.reason(),
                        "Rejected request without a valid API key"
                    );
                    Ok(AppError::Unauthorized.into_response())
                }
            }
        })
    }
}

/// Result of checking the credential on one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthOutcome {
    Granted,
    Missing,
    Invalid,
    NoSecretConfigured,
}

impl AuthOutcome {
    fn reason(self) -> &'static str {
        match self {
            AuthOutcome::Granted => "granted",
            AuthOutcome::Missing => "missing",
            AuthOutcome::Invalid => "invalid",
            AuthOutcome::NoSecretConfigured => "no_secret_configured",
        }
    }
}

fn check_api_key(expected: Option<&str>, provided: Option<&HeaderValue>) -> AuthOutcome {
    let Some(provided) = provided else {
        return AuthOutcome::Missing;
    };
    let Some(expected) = expected else {
        return AuthOutcome::NoSecretConfigured;
    };
    match provided.to_str() {
        Ok(value) if constant_time_eq(value, expected) => AuthOutcome::Granted,
        _ => AuthOutcome::Invalid,
    }
}

/// Perform constant-time comparison of two strings.
///
/// This prevents timing attacks where an attacker could determine
/// the correct API key by measuring response times.
fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
