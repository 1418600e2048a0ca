//! Prediction handlers

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use validator::Validate;

use crate::models::{
    BatchPredictionRequest, BatchPredictionResponse, EmployeeFeatures, PredictionResponse,
    MAX_BATCH_SIZE,
};
use crate::{AppError, AppResult, AppState};

/// Score one employee
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<EmployeeFeatures>, JsonRejection>,
) -> AppResult<Json<PredictionResponse>> {
    let Json(features) = payload?;
    features.validate()?;

    let response = state.predictor.predict(&features);
    tracing::debug!(
        risk_percent = response.risk_percent,
        bucket = %response.risk_bucket,
        "prediction served"
    );

    Ok(Json(response))
}

/// Score many employees in one call, with bucket counts
pub async fn predict_batch(
    State(state): State<AppState>,
    payload: Result<Json<BatchPredictionRequest>, JsonRejection>,
) -> AppResult<Json<BatchPredictionResponse>> {
    let Json(req) = payload?;

    if req.employees.len() > MAX_BATCH_SIZE {
        return Err(AppError::PayloadTooLarge(format!(
            "batch of {} exceeds the limit of {} employees",
            req.employees.len(),
            MAX_BATCH_SIZE
        )));
    }

    for (index, employee) in req.employees.iter().enumerate() {
        employee
            .validate()
            .map_err(|e| AppError::ValidationError(format!("employees[{index}]: {e}")))?;
    }

    let response = state.predictor.predict_batch(&req.employees);
    tracing::debug!(
        count = response.predictions.len(),
        high = response.summary.high,
        "batch prediction served"
    );

    Ok(Json(response))
}
