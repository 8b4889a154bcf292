//! Global error rendering.
//!
//! Handlers and extractors turn failures into [`AppError`] responses. This
//! module covers the two paths that are not a handler returning `Err`:
//!
//! - a panic inside a handler, caught by `CatchPanicLayer` and turned into
//!   a 500 by [`handle_panic`]
//! - attaching the diagnostic stack to 500 bodies in development mode,
//!   done by [`render_error_details`]

use std::any::Any;

use axum::Json;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::config::RuntimeMode;
use crate::error::{AppError, ErrorBody, ErrorReport};

/// Convert a caught panic into a 500 response.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    };

    AppError::Internal(format!("handler panicked: {detail}")).into_response()
}

/// Add the error stack to server-error bodies when running in development.
///
/// Production responses pass through untouched, so clients only ever see
/// the generic message.
pub async fn render_error_details(
    State(mode): State<RuntimeMode>,
    req: Request,
    next: Next,
) -> Response {
    let response = next.run(req).await;

    if !mode.exposes_error_details() {
        return response;
    }

    match response.extensions().get::<ErrorReport>().cloned() {
        Some(report) => (
            response.status(),
            Json(ErrorBody {
                message: report.message,
                stack: Some(report.stack),
            }),
        )
            .into_response(),
        None => response,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::routing::get;
    use serde_json::Value;
    use tower::ServiceExt;

    async fn failing() -> Result<&'static str, AppError> {
        Err(AppError::Internal("disk on fire".to_string()))
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn call(mode: RuntimeMode, uri: &str) -> Response {
        let app = Router::new()
            .route("/fail", get(failing))
            .route("/missing", get(|| async { AppError::product_not_found() }))
            .layer(axum::middleware::from_fn_with_state(
                mode,
                render_error_details,
            ));
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[test]
    fn test_handle_panic_string_payload() {
        let response = handle_panic(Box::new("kaboom".to_string()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let report = response.extensions().get::<ErrorReport>().unwrap();
        assert!(report.stack.contains("kaboom"));
    }

    #[test]
    fn test_handle_panic_str_payload() {
        let response = handle_panic(Box::new("static kaboom"));
        let report = response.extensions().get::<ErrorReport>().unwrap();
        assert!(report.stack.contains("static kaboom"));
    }

    #[tokio::test]
    async fn test_development_exposes_stack() {
        let response = call(RuntimeMode::Development, "/fail").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["message"], "Internal Server Error");
        assert!(body["stack"].as_str().unwrap().contains("disk on fire"));
    }

    #[tokio::test]
    async fn test_production_hides_stack() {
        let response = call(RuntimeMode::Production, "/fail").await;
        let body = body_json(response).await;
        assert_eq!(body["message"], "Internal Server Error");
        assert!(body.get("stack").is_none());
    }

    #[tokio::test]
    async fn test_client_errors_untouched_in_development() {
        let response = call(RuntimeMode::Development, "/missing").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Product not found");
        assert!(body.get("stack").is_none());
    }
}
