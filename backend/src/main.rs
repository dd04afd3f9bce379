//! Agricultural field monitoring - Backend Server
//!
//! Computes NDVI vegetation health from Sentinel-2 imagery for points and
//! field boundaries, and tracks how it changes over time.

use axum::{routing::get, Router};
use std::{net::SocketAddr, sync::Arc};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
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

pub use config::Config;

use external::{ImageryProvider, SentinelHubClient};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub provider: Arc<dyn ImageryProvider>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agromonitor_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::load()?;

    tracing::info!("Starting agricultural monitoring server");
    tracing::info!("Environment: {}", config.environment);

    let provider = SentinelHubClient::new(&config.sentinel_hub)?;
    tracing::info!(
        collection = %config.sentinel_hub.data_collection,
        "Sentinel Hub client ready"
    );

    // Create application state
    let state = AppState {
        config: Arc::new(config.clone()),
        provider: Arc::new(provider),
    };

    // Build application
    let app = create_app(state);

    // Start server
    let ip: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::from((ip, config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

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
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors),
        )
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Agricultural Monitoring NDVI API v1.0"
}
