//! Offline Training
//!
//! CSV → stratified split → fit pipeline → held-out report → artifact.
//! The artifact is only written after every earlier step has succeeded.

pub mod dataset;
pub mod metrics;
pub mod split;

use std::path::PathBuf;

use crate::pipeline::{AttritionPipeline, LogisticParams, ModelBundle, ModelError, TrainingSummary};

pub use dataset::{DatasetError, LabeledData};
pub use metrics::ClassificationReport;
pub use split::{stratified_split, SplitIndices};

pub const DEFAULT_DATA_PATH: &str = "WA_Fn-UseC_-HR-Employee-Attrition.csv";
pub const DEFAULT_MODEL_PATH: &str = "attrition_model.json";
pub const DEFAULT_TEST_SIZE: f64 = 0.2;
pub const DEFAULT_SEED: u64 = 42;

#[derive(Debug, thiserror::Error)]
pub enum TrainError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("invalid training configuration: {0}")]
    Config(String),
}

#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub data_path: PathBuf,
    pub output_path: PathBuf,
    /// Fraction of rows held out for evaluation, in (0, 1)
    pub test_size: f64,
    pub seed: u64,
    pub params: LogisticParams,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            output_path: PathBuf::from(DEFAULT_MODEL_PATH),
            test_size: DEFAULT_TEST_SIZE,
            seed: DEFAULT_SEED,
            params: LogisticParams::default(),
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<(), TrainError> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(TrainError::Config(format!(
                "test size must be in (0, 1), got {}",
                self.test_size
            )));
        }
        if self.params.max_iter == 0 {
            return Err(TrainError::Config("max iterations must be at least 1".to_string()));
        }
        if !(self.params.c > 0.0) {
            return Err(TrainError::Config(format!("C must be positive, got {}", self.params.c)));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct TrainOutcome {
    pub bundle: ModelBundle,
    pub report: ClassificationReport,
}

/// Fit and evaluate from in-memory data; nothing is written
pub fn train_on(data: &LabeledData, config: &TrainConfig) -> Result<TrainOutcome, TrainError> {
    config.validate()?;

    let split = stratified_split(&data.labels, config.test_size, config.seed);
    let train = data.select(&split.train);
    let test = data.select(&split.test);
    tracing::info!(
        train_rows = train.len(),
        test_rows = test.len(),
        seed = config.seed,
        "stratified split"
    );

    let (pipeline, stats) = AttritionPipeline::fit(&train.records, &train.labels, &config.params)?;
    if stats.converged {
        tracing::info!(iterations = stats.iterations, loss = stats.final_loss, "model fitted");
    } else {
        tracing::warn!(
            iterations = stats.iterations,
            max_iter = config.params.max_iter,
            "solver hit the iteration cap before converging"
        );
    }

    let scores = pipeline.predict_proba_batch(&test.records).to_vec();
    let predicted = pipeline.predict(&test.records);
    let report = ClassificationReport::new(&test.labels, &predicted, &scores);

    let summary = TrainingSummary {
        source: config.data_path.display().to_string(),
        rows: data.len(),
        train_rows: train.len(),
        test_rows: test.len(),
        positive_rate: data.positive_rate(),
        seed: config.seed,
        iterations: stats.iterations,
        converged: stats.converged,
        holdout_accuracy: report.accuracy,
        holdout_roc_auc: report.roc_auc,
    };

    Ok(TrainOutcome {
        bundle: ModelBundle::new(pipeline, summary),
        report,
    })
}

/// Full run: read `data_path`, train, evaluate, save to `output_path`
pub fn run(config: &TrainConfig) -> Result<TrainOutcome, TrainError> {
    config.validate()?;
    let data = dataset::load_csv(&config.data_path)?;
    let outcome = train_on(&data, config)?;
    outcome.bundle.save(&config.output_path)?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::tests::synthetic;
    use tempfile::tempdir;

    fn data(n: usize) -> LabeledData {
        let (records, labels) = synthetic(n, 3);
        LabeledData { records, labels }
    }

    #[test]
    fn train_on_reports_holdout_metrics() {
        let outcome = train_on(&data(400), &TrainConfig::default()).unwrap();

        assert_eq!(outcome.bundle.training.rows, 400);
        assert_eq!(outcome.bundle.training.train_rows + outcome.bundle.training.test_rows, 400);
        assert_eq!(outcome.report.macro_avg.support, outcome.bundle.training.test_rows);
        let auc = outcome.report.roc_auc.unwrap();
        assert!(auc > 0.5, "auc {auc}");
    }

    #[test]
    fn training_is_reproducible() {
        let a = train_on(&data(200), &TrainConfig::default()).unwrap();
        let b = train_on(&data(200), &TrainConfig::default()).unwrap();
        assert_eq!(a.bundle.pipeline, b.bundle.pipeline);
        assert_eq!(a.report, b.report);
    }

    #[test]
    fn invalid_test_size_is_rejected() {
        let config = TrainConfig {
            test_size: 1.0,
            ..TrainConfig::default()
        };
        assert!(matches!(train_on(&data(50), &config), Err(TrainError::Config(_))));
    }

    #[test]
    fn non_finite_feature_aborts_fit() {
        let mut rows = data(100);
        for record in &mut rows.records {
            record.monthly_income = f64::NAN;
        }
        assert!(matches!(
            train_on(&rows, &TrainConfig::default()),
            Err(TrainError::Model(ModelError::NonFiniteInput(_)))
        ));
    }

    #[test]
    fn unreadable_data_writes_no_artifact() {
        let dir = tempdir().unwrap();
        let config = TrainConfig {
            data_path: dir.path().join("missing.csv"),
            output_path: dir.path().join("model.json"),
            ..TrainConfig::default()
        };

        assert!(matches!(run(&config), Err(TrainError::Dataset(_))));
        assert!(!config.output_path.exists());
    }
}
