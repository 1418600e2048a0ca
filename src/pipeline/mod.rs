//! Attrition Model Pipeline
//!
//! Preprocessing (one-hot + passthrough) chained with a logistic regression.
//! Fitted by the trainer, persisted as a `ModelBundle`, loaded read-only by
//! the service.

pub mod artifact;
pub mod encoder;
pub mod logistic;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::models::EmployeeFeatures;
use crate::schema::SchemaMismatchError;

pub use artifact::{ModelBundle, TrainingSummary, ARTIFACT_FORMAT_VERSION};
pub use encoder::{OneHotEncoder, Preprocessor};
pub use logistic::{ClassWeight, FitStats, LogisticParams, LogisticRegression};

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("training set is empty")]
    EmptyTrainingSet,

    #[error("training labels contain a single class; both classes are required")]
    SingleClass,

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("shape mismatch: {0}")]
    Shape(String),

    #[error("design matrix row {0} contains a non-finite value")]
    NonFiniteInput(usize),

    #[error("Newton system is singular")]
    SingularSystem,

    #[error("optimisation diverged to non-finite coefficients")]
    Diverged,

    #[error("failed to access artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("artifact is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported artifact format version {found} (expected {expected})")]
    UnsupportedFormat { found: u32, expected: u32 },

    #[error("artifact checksum mismatch: recorded {recorded}, computed {computed}")]
    ChecksumMismatch { recorded: String, computed: String },

    #[error(transparent)]
    Schema(#[from] SchemaMismatchError),
}

// ============================================================================
// PIPELINE
// ============================================================================

/// Probability cut-off used for hard class predictions
pub const DECISION_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttritionPipeline {
    pub preprocess: Preprocessor,
    pub model: LogisticRegression,
}

impl AttritionPipeline {
    /// Fit preprocessing and classifier on labelled records (labels in {0, 1})
    pub fn fit(
        records: &[EmployeeFeatures],
        labels: &[u8],
        params: &LogisticParams,
    ) -> Result<(Self, FitStats), ModelError> {
        if records.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }

        let preprocess = Preprocessor::fit(records);
        let x = preprocess.transform(records);
        tracing::debug!(
            rows = x.nrows(),
            columns = x.ncols(),
            "design matrix built"
        );

        let (model, stats) = LogisticRegression::fit(&x, labels, params)?;
        Ok((Self { preprocess, model }, stats))
    }

    /// Positive-class (attrition) probability for one record
    pub fn predict_proba(&self, record: &EmployeeFeatures) -> f64 {
        let row = self.preprocess.transform_one(record);
        self.model.predict_proba(row.view())
    }

    pub fn predict_proba_batch(&self, records: &[EmployeeFeatures]) -> Array1<f64> {
        let x = self.preprocess.transform(records);
        self.model.predict_proba_matrix(&x)
    }

    /// Hard 0/1 predictions at `DECISION_THRESHOLD`
    pub fn predict(&self, records: &[EmployeeFeatures]) -> Vec<u8> {
        self.predict_proba_batch(records)
            .iter()
            .map(|&p| u8::from(p >= DECISION_THRESHOLD))
            .collect()
    }

    /// Encoded width must match the coefficient count
    pub fn check(&self) -> Result<(), ModelError> {
        self.preprocess.encoder.check()?;
        let width = self.preprocess.width();
        if self.model.n_features() != width {
            return Err(ModelError::Shape(format!(
                "model has {} coefficients but preprocessing yields {} columns",
                self.model.n_features(),
                width
            )));
        }
        if !self.model.coefficients.iter().all(|c| c.is_finite()) || !self.model.intercept.is_finite() {
            return Err(ModelError::Shape("non-finite coefficients".to_string()));
        }
        Ok(())
    }

    /// `(column, coefficient)` pairs in encoded column order
    pub fn coefficients(&self) -> Vec<(String, f64)> {
        self.preprocess
            .feature_names()
            .into_iter()
            .zip(self.model.coefficients.iter().copied())
            .collect()
    }
}
