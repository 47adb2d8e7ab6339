//! HTTP server wiring

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc, time::Instant};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use super::handlers;
use crate::config::AppConfig;
use crate::engine::GridStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<GridStore>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: Arc<GridStore>) -> Self {
        Self { store, start_time: Instant::now() }
    }
}

pub fn create_cors_layer(config: &AppConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if config.cors.allowed_origins.iter().any(|o| o == "*") {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(origins)
}

pub fn router(state: AppState, config: &AppConfig) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/prices", get(handlers::get_prices).post(handlers::set_cell))
        .route("/api/add-column", post(handlers::add_column))
        .route("/api/add-row", post(handlers::add_row))
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(TraceLayer::new_for_http())
        .layer(create_cors_layer(config))
}

/// Serve on an already-bound listener until it fails or `shutdown` resolves.
pub async fn serve_with_listener(
    listener: tokio::net::TcpListener,
    app: Router,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let addr = listener.local_addr().context("listener has no local address")?;
    info!("Price grid API listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("server error")
}

pub async fn serve(config: &AppConfig, store: Arc<GridStore>) -> Result<()> {
    let addr: SocketAddr = config
        .server_address()
        .parse()
        .with_context(|| format!("invalid server address '{}'", config.server_address()))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;

    let app = router(AppState::new(store), config);
    serve_with_listener(listener, app, shutdown_signal()).await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for ctrl-c; running until killed");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

pub fn print_routes() {
    println!("Price Grid Routes:");
    println!("==================");
    println!("  GET  /health           - Liveness and grid dimensions");
    println!("  GET  /api/prices       - Full grid {{heights, widths, prices}}");
    println!("  POST /api/prices       - Set one cell {{row, col, newValue}}");
    println!("  POST /api/add-column   - Append a width {{newWidth}}");
    println!("  POST /api/add-row      - Append a height {{newHeight, prices}}");
}
