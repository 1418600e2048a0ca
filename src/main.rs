//! Attrition risk prediction server
//!
//! Loads the trained artifact once, then serves predictions until shut down.
//! A missing or invalid artifact stops startup with the underlying cause.

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use attrition_risk::{config::Config, create_router, AppState, Predictor};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "attrition_risk=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Attrition risk service starting...");
    tracing::info!("Model: {}", config.model_path.display());

    let predictor = Predictor::load(&config.model_path).with_context(|| {
        format!("failed to load model from {}", config.model_path.display())
    })?;

    let addr = config.bind_addr();
    let app = create_router(AppState::new(predictor, config));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {}", e);
    }
}
