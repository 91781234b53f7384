//! Results API server implementation
//!
//! HTTP server using Axum. Accepts spreadsheet uploads as multipart forms and
//! answers with JSON previews or .xlsx downloads.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers;

/// Default cap on upload size (10 MiB)
pub const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// API Server configuration
#[derive(Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Maximum request body size in bytes
    pub body_limit: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub version: String,
}

/// Build the router with all endpoints and middleware
pub fn build_router(state: Arc<AppState>, body_limit: usize) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/version", get(handlers::version))
        // Upload endpoints
        .route("/api/v1/results/preview", post(handlers::results_preview))
        .route("/api/v1/results", post(handlers::results_download))
        .route("/api/v1/top/preview", post(handlers::top_preview))
        .route("/api/v1/top", post(handlers::top_download))
        // State and middleware
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Run the API server
pub async fn run_api_server(config: ApiConfig) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "talent_server=info,talent_results=info,tower_http=info".into()),
        )
        .init();

    let state = Arc::new(AppState {
        version: env!("CARGO_PKG_VERSION").to_string(),
    });
    let app = build_router(state, config.body_limit);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("🏆 Talent Results Server starting on http://{}", addr);
    info!("   Endpoints: /api/v1/results, /api/v1/results/preview, /api/v1/top, /api/v1/top/preview");
    info!("   Health: /health, Version: /version");
    info!("   Upload limit: {} bytes", config.body_limit);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Talent Results Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping server...");
}
