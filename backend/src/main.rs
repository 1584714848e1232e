//! Maritime Weather Assistant - Backend Server
//!
//! Weather-aware assistant for mariners: scans the sea around a position for
//! notable weather, serves point forecasts, and asks a language model for
//! disaster-risk summaries and route suggestions.

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod external;
mod handlers;
mod routes;
mod services;

#[cfg(test)]
mod test_support;

pub use config::Config;

use external::{OpenAiClient, WeatherSampleProvider};
use services::GridScanner;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub provider: Arc<dyn WeatherSampleProvider>,
    pub scanner: Arc<GridScanner>,
    pub openai: Option<OpenAiClient>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mwa_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::load()?;

    tracing::info!("Starting Maritime Weather Assistant Server");
    tracing::info!("Environment: {}", config.environment);

    let provider = external::build_provider(&config.weather)?;

    let openai = OpenAiClient::from_config(&config.openai)?;
    if openai.is_none() {
        tracing::warn!("openai.api_key is not set; AI endpoints are disabled");
    }

    let scanner = Arc::new(GridScanner::new(&config.scanner));
    tracing::info!(
        "Grid scanner ready: {} workers, {} cell limit",
        scanner.concurrency(),
        scanner.max_cells()
    );

    // Create application state
    let state = AppState {
        config: Arc::new(config.clone()),
        provider,
        scanner: scanner.clone(),
        openai,
    };

    // Build application
    let app = create_app(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scanner.shutdown();
    tracing::info!("Server stopped");

    Ok(())
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Maritime Weather Assistant API v1"
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
            sigterm.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
