//! Application routing configuration with middleware stack.
//!
//! # Middleware Stack (applied in order)
//!
//! ```text
//! Request
//!    │
//!    ▼
//! ┌──────────────────┐
//! │  Request Logger  │ ← Logs method/path, adds X-Request-Id header
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │      CORS        │ ← Cross-origin headers
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │  Error Details   │ ← Adds `stack` to 500 bodies in development
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │  Panic Catcher   │ ← 500 instead of a dropped connection
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │  Authentication  │ ← 401 if invalid (POST, PUT, DELETE only)
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │    Validation    │ ← 400 if the body is invalid (POST, PUT only)
//! └────────┬─────────┘
//!          │
//!          ▼
//!      Handler
//! ```
//!
//! # Routes
//!
//! - `/` - Welcome text
//! - `/api/products` - List (GET), create (POST)
//! - `/api/products/stats` - Statistics (GET)
//! - `/api/products/{id}` - Get (GET), update (PUT), delete (DELETE)
//!
//! Each product route also answers with a single trailing slash.
//!
//! Anything else, including an unsupported method on a known path,
//! answers 404 `Route not found`.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{MethodRouter, delete, get, post, put};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::handlers;
use crate::middleware::{ApiKeyAuth, RequestLogLayer, handle_panic, render_error_details};
use crate::state::AppState;

/// Mount point of the product resource.
pub const API_PREFIX: &str = "/api/products";

/// Build the application router with all routes and middleware configured.
///
/// The authenticator is attached per route, so reads stay public.
pub fn build_router(state: AppState) -> Router {
    let config = &state.config;

    let auth = ApiKeyAuth::new(config.api_key.clone());
    if auth.has_secret() {
        info!("API key authentication enabled for POST, PUT and DELETE");
    } else {
        warn!("No API_KEY set, every POST, PUT and DELETE will be rejected");
    }

    let cors = build_cors_layer(&config.cors_allowed_origins);

    // =========================================================================
    // Routes
    // =========================================================================
    let collection = get(handlers::list_products)
        .merge(post(handlers::create_product).route_layer(auth.clone()));

    let item = get(handlers::get_product).merge(
        put(handlers::update_product)
            .merge(delete(handlers::delete_product))
            .route_layer(auth),
    );

    let router = Router::new().route("/", with_fallback(get(handlers::welcome)));
    let router = route_lenient(router, API_PREFIX, collection);
    let router = route_lenient(
        router,
        &format!("{API_PREFIX}/stats"),
        get(handlers::product_stats),
    );
    let router = route_lenient(router, &format!("{API_PREFIX}/{{id}}"), item);
    let mut router = router.fallback(handlers::route_not_found);

    // =========================================================================
    // Apply Middleware Stack (order matters - applied bottom to top)
    // =========================================================================

    // 1. Request body size limit
    info!(
        max_size_bytes = config.max_request_body_size,
        "Request body size limit configured"
    );
    router = router.layer(DefaultBodyLimit::max(config.max_request_body_size));

    // 2. Panics become 500 responses
    router = router.layer(CatchPanicLayer::custom(handle_panic));

    // 3. Development diagnostics on server errors
    router = router.layer(axum::middleware::from_fn_with_state(
        config.mode,
        render_error_details,
    ));

    // 4. CORS
    router = router.layer(cors);

    // 5. Request logger, outermost so it sees every request and final status
    router = router.layer(RequestLogLayer::new());

    router.with_state(state)
}

/// Mount `route` at `path` and at `path/`.
fn route_lenient(
    router: Router<AppState>,
    path: &str,
    route: MethodRouter<AppState>,
) -> Router<AppState> {
    let route = with_fallback(route);
    router
        .route(&format!("{path}/"), route.clone())
        .route(path, route)
}

/// Answer unsupported methods with `Route not found` instead of 405.
fn with_fallback(route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.fallback(handlers::route_not_found)
}

/// Build CORS layer from configuration.
///
/// `*` anywhere in the list allows any origin; otherwise only the listed
/// origins that parse as header values are allowed.
fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let allow_any = allowed_origins.iter().any(|o| o == "*");

    let layer = if allow_any {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(origins)
    };

    layer.allow_methods(Any).allow_headers(Any)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use tower::{Layer, ServiceExt};

    use crate::config::Config;
    use crate::store::MemoryStore;

    fn app() -> Router {
        let config = Config {
            api_key: Some("secret".to_string()),
            ..Config::default()
        };
        build_router(AppState::new(Arc::new(MemoryStore::new()), config))
    }

    async fn send(method: Method, uri: &str) -> axum::response::Response {
        app()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn allowed_origin(allowed: &[&str], origin: &str) -> Option<String> {
        let allowed: Vec<String> = allowed.iter().map(ToString::to_string).collect();
        let inner = tower::service_fn(|_req: Request<Body>| async {
            Ok::<_, std::convert::Infallible>(axum::response::Response::new(Body::empty()))
        });
        let response = build_cors_layer(&allowed)
            .layer(inner)
            .oneshot(
                Request::builder()
                    .uri(API_PREFIX)
                    .header(header::ORIGIN, origin)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .map(|v| v.to_str().unwrap().to_string())
    }

    async fn send_with_key(method: Method, uri: &str) -> axum::response::Response {
        app()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header("x-api-key", "secret")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_build_cors_layer_any() {
        let origin = allowed_origin(&["*"], "https://anywhere.test").await;
        assert_eq!(origin.as_deref(), Some("*"));
    }

    #[tokio::test]
    async fn test_build_cors_layer_specific() {
        let allowed = ["https://example.com", "not a header value\n"];

        let origin = allowed_origin(&allowed, "https://example.com").await;
        assert_eq!(origin.as_deref(), Some("https://example.com"));

        let origin = allowed_origin(&allowed, "https://evil.test").await;
        assert_eq!(origin, None);
    }

    #[tokio::test]
    async fn test_trailing_slash_routes() {
        let response = send(Method::GET, "/api/products/").await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(Method::GET, "/api/products/stats/").await;
        assert_eq!(response.status(), StatusCode::OK);

        let uri = format!("{API_PREFIX}/{}/", uuid::Uuid::new_v4());
        let response = send(Method::GET, &uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], br#"{"message":"Product not found"}"#);
    }

    #[tokio::test]
    async fn test_undecodable_id_is_product_not_found() {
        for method in [Method::GET, Method::DELETE] {
            let response = send_with_key(method, "/api/products/%FF").await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
            let content_type = response.headers().get(header::CONTENT_TYPE).unwrap();
            assert_eq!(content_type, "application/json");
            let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
            assert_eq!(&body[..], br#"{"message":"Product not found"}"#);
        }
    }

    #[tokio::test]
    async fn test_welcome_is_plain_text() {
        let response = send(Method::GET, "/").await;
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers().get(header::CONTENT_TYPE).unwrap();
        assert!(content_type.to_str().unwrap().starts_with("text/plain"));
    }

    #[tokio::test]
    async fn test_unknown_path_is_route_not_found() {
        let response = send(Method::GET, "/api/widgets").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unsupported_method_is_route_not_found() {
        let response = send(Method::PATCH, API_PREFIX).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_requires_key() {
        let uri = format!("{API_PREFIX}/{}", uuid::Uuid::new_v4());
        let response = send(Method::DELETE, &uri).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_reads_are_public() {
        let response = send(Method::GET, API_PREFIX).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
