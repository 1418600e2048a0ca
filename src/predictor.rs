//! Prediction service core
//!
//! Owns the loaded `ModelBundle`. Built once at startup and shared read-only
//! across requests; nothing in here mutates after construction.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::explain;
use crate::models::{BatchPredictionResponse, EmployeeFeatures, PredictionResponse, RiskBucket};
use crate::pipeline::{ModelBundle, ModelError, TrainingSummary};

/// Probability → percent with one decimal, clamped to [0, 100]
pub fn to_risk_percent(probability: f64) -> f64 {
    ((probability * 1000.0).round() / 10.0).clamp(0.0, 100.0)
}

#[derive(Debug)]
pub struct Predictor {
    bundle: ModelBundle,
}

impl Predictor {
    /// Wrap an in-memory bundle after schema/shape verification
    pub fn new(bundle: ModelBundle) -> Result<Self, ModelError> {
        bundle.verify()?;
        Ok(Self { bundle })
    }

    /// Read and verify an artifact from disk
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let bundle = ModelBundle::load(path)?;
        tracing::info!(
            path = %path.display(),
            trained_at = %bundle.trained_at,
            encoded_columns = bundle.pipeline.preprocess.width(),
            "model loaded"
        );
        Ok(Self { bundle })
    }

    pub fn bundle(&self) -> &ModelBundle {
        &self.bundle
    }

    /// Raw positive-class probability
    pub fn probability(&self, record: &EmployeeFeatures) -> f64 {
        self.bundle.pipeline.predict_proba(record)
    }

    pub fn predict(&self, record: &EmployeeFeatures) -> PredictionResponse {
        let risk_percent = to_risk_percent(self.probability(record));

        PredictionResponse {
            risk_percent,
            risk_bucket: RiskBucket::from_percent(risk_percent),
            reasons: explain::reasons(record),
        }
    }

    pub fn predict_batch(&self, records: &[EmployeeFeatures]) -> BatchPredictionResponse {
        records.iter().map(|record| self.predict(record)).collect()
    }

    pub fn status(&self) -> ModelStatus {
        let bundle = &self.bundle;
        let vocabulary_sizes = bundle
            .categorical_features
            .iter()
            .cloned()
            .zip(bundle.pipeline.preprocess.encoder.categories.iter().map(Vec::len))
            .collect();

        ModelStatus {
            loaded: true,
            model_type: "logistic_regression",
            format_version: bundle.format_version,
            schema_version: bundle.schema_version,
            schema_hash: format!("{:08x}", bundle.schema_hash),
            trained_at: bundle.trained_at,
            numeric_features: bundle.numeric_features.clone(),
            categorical_features: bundle.categorical_features.clone(),
            vocabulary_sizes,
            encoded_columns: bundle.pipeline.preprocess.width(),
            intercept: bundle.pipeline.model.intercept,
            coefficients: bundle
                .pipeline
                .coefficients()
                .into_iter()
                .map(|(feature, coefficient)| FeatureWeight { feature, coefficient })
                .collect(),
            training: bundle.training.clone(),
        }
    }
}

/// Loaded model report for `/model`
#[derive(Debug, Clone, Serialize)]
pub struct ModelStatus {
    pub loaded: bool,
    pub model_type: &'static str,
    pub format_version: u32,
    pub schema_version: u8,
    pub schema_hash: String,
    pub trained_at: DateTime<Utc>,
    pub numeric_features: Vec<String>,
    pub categorical_features: Vec<String>,
    pub vocabulary_sizes: BTreeMap<String, usize>,
    pub encoded_columns: usize,
    pub intercept: f64,
    /// Learned weights in encoded column order; not used for `reasons`
    pub coefficients: Vec<FeatureWeight>,
    pub training: TrainingSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureWeight {
    pub feature: String,
    pub coefficient: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{content_employee, sample_employee};
    use crate::pipeline::tests::{fitted_pipeline, summary};
    use tempfile::tempdir;

    fn predictor() -> Predictor {
        Predictor::new(ModelBundle::new(fitted_pipeline(), summary())).unwrap()
    }

    #[test]
    fn percent_has_one_decimal() {
        assert_eq!(to_risk_percent(0.12345), 12.3);
        assert_eq!(to_risk_percent(0.6), 60.0);
        assert_eq!(to_risk_percent(1.0), 100.0);
        assert_eq!(to_risk_percent(0.0), 0.0);
    }

    #[test]
    fn response_is_consistent() {
        let predictor = predictor();
        let response = predictor.predict(&sample_employee());

        assert!((0.0..=100.0).contains(&response.risk_percent));
        assert_eq!(response.risk_bucket, RiskBucket::from_percent(response.risk_percent));
        assert!((1..=explain::MAX_REASONS).contains(&response.reasons.len()));
    }

    #[test]
    fn fallback_reason_for_content_employee() {
        let response = predictor().predict(&content_employee());
        assert_eq!(response.reasons, vec![explain::NO_RISK_FACTORS]);
    }

    #[test]
    fn reload_gives_identical_predictions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("attrition_model.json");
        let original = predictor();
        original.bundle().save(&path).unwrap();

        let reloaded = Predictor::load(&path).unwrap();
        for record in [sample_employee(), content_employee()] {
            assert_eq!(original.probability(&record), reloaded.probability(&record));
            assert_eq!(original.predict(&record), reloaded.predict(&record));
        }
    }

    #[test]
    fn batch_matches_single() {
        let predictor = predictor();
        let records = vec![sample_employee(), content_employee()];
        let batch = predictor.predict_batch(&records);

        assert_eq!(batch.predictions[0], predictor.predict(&records[0]));
        assert_eq!(batch.predictions[1], predictor.predict(&records[1]));
        let total = batch.summary.high + batch.summary.medium + batch.summary.low;
        assert_eq!(total, 2);
    }

    #[test]
    fn status_lists_schema() {
        let status = predictor().status();
        assert!(status.loaded);
        assert_eq!(status.numeric_features.len(), crate::schema::NUMERIC_COUNT);
        assert_eq!(status.vocabulary_sizes.len(), crate::schema::CATEGORICAL_COUNT);
        assert_eq!(status.vocabulary_sizes["OverTime"], 2);
        assert_eq!(status.schema_hash.len(), 8);
        assert_eq!(status.coefficients.len(), status.encoded_columns);
        assert!(status.coefficients.iter().any(|w| w.feature == "OverTime=Yes"));
        assert_eq!(
            status.coefficients.last().map(|w| w.feature.as_str()),
            Some("JobInvolvement")
        );
    }

    #[test]
    fn new_rejects_broken_bundle() {
        let mut bundle = ModelBundle::new(fitted_pipeline(), summary());
        bundle.pipeline.model.coefficients.clear();
        assert!(Predictor::new(bundle).is_err());
    }
}
