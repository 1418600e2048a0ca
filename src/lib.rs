//! Employee Attrition Risk
//!
//! Offline trainer and HTTP prediction service sharing one feature schema.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────┐              ┌──────────────────────────────┐
//! │  attrition-train (CLI)   │              │  attrition-risk (Axum)       │
//! │                          │   artifact   │                              │
//! │  CSV → split → fit ──────┼──► .json ───►│  Predictor (Arc, read-only)  │
//! │        └→ holdout report │              │   /health /predict /model    │
//! └──────────────────────────┘              └──────────────────────────────┘
//!            └──────────────── schema.rs ───────────────┘
//! ```

pub mod config;
pub mod error;
pub mod explain;
pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod predictor;
pub mod schema;
pub mod training;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use error::{AppError, AppResult};
pub use predictor::Predictor;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<Predictor>,
    pub config: config::Config,
}

impl AppState {
    pub fn new(predictor: Predictor, config: config::Config) -> Self {
        Self {
            predictor: Arc::new(predictor),
            config,
        }
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/model", get(handlers::model::status))
        .route("/predict", post(handlers::predict::predict))
        .route("/predict/batch", post(handlers::predict::predict_batch))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
