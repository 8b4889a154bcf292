//! Request logging middleware.
//!
//! Records the timestamp, method and full path of every request, tags it
//! with a request ID, and reports its outcome once the response is ready.
//! It never rejects a request.
//!
//! # Request IDs
//!
//! - An incoming `X-Request-Id` header is kept as is
//! - Otherwise a UUIDv4 is generated
//! - The ID is written back on the response for correlation
//!
//! ```bash
//! curl -H "X-Request-Id: my-correlation-id" http://localhost:3000/api/products
//! ```

use std::task::{Context, Poll};
use std::time::Instant;

use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::header::HeaderValue;
use axum::http::{Request, Response};
use chrono::{SecondsFormat, Utc};
use tower::{Layer, Service};
use tracing::{Instrument, debug, info, info_span};
use uuid::Uuid;

use crate::metrics;

/// Header name for request ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Metrics label for requests that matched no route.
const UNMATCHED_ROUTE: &str = "unmatched";

/// Request logging layer for the Tower middleware stack.
#[derive(Clone, Default)]
pub struct RequestLogLayer;

impl RequestLogLayer {
    /// Create a new request logging layer.
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for RequestLogLayer {
    type Service = RequestLogService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestLogService { inner }
    }
}

/// Request logging service wrapper.
#[derive(Clone)]
pub struct RequestLogService<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for RequestLogService<S>
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

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let started = Instant::now();
        let request_id = extract_or_generate_request_id(&req);
        let header_value = HeaderValue::from_str(&request_id)
            .unwrap_or_else(|_| HeaderValue::from_static("unknown"));
        req.headers_mut()
            .insert(REQUEST_ID_HEADER, header_value.clone());

        let method = req.method().clone();
        let path = req
            .uri()
            .path_and_query()
            .map_or_else(|| req.uri().path().to_string(), ToString::to_string);
        let route = req
            .extensions()
            .get::<MatchedPath>()
            .map_or(UNMATCHED_ROUTE, MatchedPath::as_str)
            .to_string();

        let span = info_span!("request", request_id = %request_id, %method, path = %path);
        info!(
            parent: &span,
            timestamp = %Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            "{method} {path}"
        );

        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(
            async move {
                let mut response = inner.call(req).await?;
                response
                    .headers_mut()
                    .insert(REQUEST_ID_HEADER, header_value);

                let elapsed = started.elapsed();
                let status = response.status();
                debug!(
                    status = status.as_u16(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Request completed"
                );
                metrics::record_request(
                    &route,
                    method.as_str(),
                    status.as_str(),
                    elapsed.as_secs_f64(),
                );

                Ok(response)
            }
            .instrument(span),
        )
    }
}

/// Extract request ID from headers or generate a new one.
fn extract_or_generate_request_id<B>(req: &Request<B>) -> String {
    if let Some(header_value) = req.headers().get(REQUEST_ID_HEADER)
        && let Ok(value) = header_value.to_str()
        && !value.is_empty()
    {
        return value.to_string();
    }

    Uuid::new_v4().to_string()
}
