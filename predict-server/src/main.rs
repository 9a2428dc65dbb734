//! Groundwater Safety Prediction Server
//!
//! Serves Safe/Unsafe predictions from the deployed model artifact.
//!
//! # Routes
//!
//! - `GET  /health`  - liveness + deployed model name
//! - `POST /predict` - JSON object with the eleven measurements

mod config;
mod handlers;
mod error;


use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use std::net::SocketAddr;
use std::sync::Arc;

use groundwater_core::DeployedModel;

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "groundwater_predict=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!("Groundwater prediction server starting ({})...", config.environment);

    // No artifact, no service
    let model = match DeployedModel::load(&config.model_path) {
        Ok(model) => model,
        Err(e) => {
            tracing::error!("Cannot load model from {}: {}", config.model_path.display(), e);
            return Err(e).context("model artifact unavailable; train a model first");
        }
    };
    tracing::info!("Model loaded: {}", model.name());

    // Build application state
    let state = AppState {
        model: Arc::new(model),
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<DeployedModel>,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    tracing::debug!("Serving model from {}", state.config.model_path.display());

    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/predict", post(handlers::predict::predict))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
