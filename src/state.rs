//! Shared application state for Axum handlers.
//!
//! Cloned for every request; the store and configuration are behind `Arc`
//! so a clone is two reference-count bumps.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::store::ProductStore;

/// Shared application state for Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Persistence gateway for the product collection
    pub store: Arc<dyn ProductStore>,
    /// Configuration loaded at startup
    pub config: Arc<Config>,
    /// When the state was created
    pub started_at: Instant,
}

impl AppState {
    /// Create new application state.
    pub fn new(store: Arc<dyn ProductStore>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }

    /// Time since the state was created.
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}
