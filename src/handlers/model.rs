//! Loaded model status handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::predictor::ModelStatus;
use crate::AppState;

#[derive(Serialize)]
pub struct ModelStatusResponse {
    pub artifact_path: String,
    #[serde(flatten)]
    pub status: ModelStatus,
}

/// Describe the artifact this process is serving
pub async fn status(State(state): State<AppState>) -> Json<ModelStatusResponse> {
    Json(ModelStatusResponse {
        artifact_path: state.config.model_path.display().to_string(),
        status: state.predictor.status(),
    })
}
