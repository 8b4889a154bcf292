use std::net::SocketAddr;
use std::process::ExitCode;

use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use product_api::config::LogFormat;
use product_api::{AppState, Config, StoreError, build_router, metrics, store, utils};

#[tokio::main]
async fn main() -> ExitCode {
    // Configuration decides the log format, so it is loaded first.
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing("info", LogFormat::Pretty);
            error!("Configuration error: {e}");
            return ExitCode::from(exitcode::CONFIG as u8);
        }
    };
    init_tracing(&config.log_level, config.log_format);

    info!("Starting Product API v{}", env!("CARGO_PKG_VERSION"));

    match run(config).await {
        Ok(()) => ExitCode::from(exitcode::OK as u8),
        Err(exit_code) => ExitCode::from(exit_code as u8),
    }
}

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` in the environment wins over the configured level.
fn init_tracing(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

/// Run the application, returning an exit code on error.
async fn run(config: Config) -> Result<(), exitcode::ExitCode> {
    info!(
        host = %config.host,
        port = %config.port,
        mode = %config.mode,
        database_url = %config.database_url,
        "Configuration loaded"
    );
    if !config.auth_enabled() {
        warn!("API_KEY is not set; create, update and delete are disabled");
    }

    // Metrics are optional, a failed exporter only logs
    if let Some(metrics_addr) = config.metrics_addr() {
        metrics::try_init_metrics(metrics_addr);
    }

    // Open the product store
    let store = store::connect(&config.database_url).await.map_err(|e| {
        error!("Failed to open product store: {e}");
        match e {
            StoreError::UnsupportedBackend(_) => exitcode::CONFIG,
            _ => exitcode::UNAVAILABLE,
        }
    })?;

    // Build application state and router
    let addr: SocketAddr = config.server_addr().parse().map_err(|e| {
        error!("Invalid server address: {e}");
        exitcode::CONFIG
    })?;
    let state = AppState::new(store, config);
    let app = build_router(state.clone());

    // Start server
    let listener = TcpListener::bind(addr).await.map_err(|e| {
        error!("Failed to bind to {addr}: {e}");
        exitcode::UNAVAILABLE
    })?;

    info!("Server listening on http://{addr}");
    info!("API endpoints:");
    info!("  GET    /                    - Welcome message");
    info!("  GET    /api/products        - List products");
    info!("  GET    /api/products/stats  - Product statistics");
    info!("  GET    /api/products/{{id}}   - Get product");
    info!("  POST   /api/products        - Create product (API key)");
    info!("  PUT    /api/products/{{id}}   - Update product (API key)");
    info!("  DELETE /api/products/{{id}}   - Delete product (API key)");

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(utils::shutdown_signal())
        .await
        .map_err(|e| {
            error!("Server error: {e}");
            exitcode::SOFTWARE
        })?;

    info!(
        uptime_secs = state.uptime().as_secs(),
        "Server shutdown complete"
    );
    Ok(())
}
