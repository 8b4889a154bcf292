//! # Product API
//!
//! A small CRUD service for a product catalogue, built on Axum:
//!
//! - **Products**: create, list with filters and pagination, fetch, update, delete
//! - **Statistics**: totals and per-category aggregates
//! - **Security**: shared-secret API key on every write, constant-time compared
//! - **Observability**: request IDs, structured logging, Prometheus metrics
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Axum HTTP Server                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Middleware (Logger → Auth → Validator)                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Handlers (list, stats, get, create, update, delete)        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ProductStore (persistence gateway trait)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  MemoryStore (memory://)                                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use product_api::{AppState, Config, build_router, store};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let store = store::connect(&config.database_url).await?;
//!
//!     let app = build_router(AppState::new(store, config));
//!
//!     // Start the server...
//!     Ok(())
//! }
//! ```
//!
//! ## Security Configuration
//!
//! Writes are rejected unless an API key is configured and supplied:
//! ```bash
//! API_KEY=your-secret-key cargo run
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
pub mod utils;
pub mod validation;

// Re-exports for convenience
pub use config::Config;
pub use error::{AppError, AppResult};
pub use routes::build_router;
pub use state::AppState;
pub use store::{ProductStore, StoreError};
