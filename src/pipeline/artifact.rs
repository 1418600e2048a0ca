//! Model artifact - persisted pipeline + schema
//!
//! JSON document `{ "checksum": <sha256 hex>, "bundle": { ... } }`.
//! The checksum covers the serialized bundle; truncated or edited files fail
//! to load.

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{AttritionPipeline, ModelError};
use crate::schema::{self, SchemaInfo};

/// Bumped when the bundle layout changes
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Facts about the training run, stored with the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub source: String,
    pub rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub positive_rate: f64,
    pub seed: u64,
    pub iterations: usize,
    pub converged: bool,
    pub holdout_accuracy: f64,
    pub holdout_roc_auc: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBundle {
    pub format_version: u32,
    pub schema_version: u8,
    pub schema_hash: u32,
    pub trained_at: DateTime<Utc>,
    pub numeric_features: Vec<String>,
    pub categorical_features: Vec<String>,
    pub pipeline: AttritionPipeline,
    pub training: TrainingSummary,
}

#[derive(Serialize)]
struct ArtifactFileRef<'a> {
    checksum: String,
    bundle: &'a ModelBundle,
}

#[derive(Deserialize)]
struct ArtifactFile {
    checksum: String,
    bundle: ModelBundle,
}

impl ModelBundle {
    /// Wrap a fitted pipeline with the compiled schema
    pub fn new(pipeline: AttritionPipeline, training: TrainingSummary) -> Self {
        let schema = SchemaInfo::current();
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            schema_version: schema.version,
            schema_hash: schema.hash,
            trained_at: Utc::now(),
            numeric_features: schema.numeric_features,
            categorical_features: schema.categorical_features,
            pipeline,
            training,
        }
    }

    /// SHA-256 of the serialized bundle
    pub fn checksum(&self) -> Result<String, ModelError> {
        let body = serde_json::to_vec(self)?;
        Ok(hex::encode(Sha256::digest(&body)))
    }

    pub fn to_json(&self) -> Result<Vec<u8>, ModelError> {
        let file = ArtifactFileRef {
            checksum: self.checksum()?,
            bundle: self,
        };
        Ok(serde_json::to_vec_pretty(&file)?)
    }

    /// Parse and verify an artifact document
    pub fn from_json(bytes: &[u8]) -> Result<Self, ModelError> {
        let file: ArtifactFile = serde_json::from_slice(bytes)?;
        let bundle = file.bundle;

        if bundle.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ModelError::UnsupportedFormat {
                found: bundle.format_version,
                expected: ARTIFACT_FORMAT_VERSION,
            });
        }

        let computed = bundle.checksum()?;
        if computed != file.checksum {
            return Err(ModelError::ChecksumMismatch {
                recorded: file.checksum,
                computed,
            });
        }

        bundle.verify()?;
        Ok(bundle)
    }

    /// Schema and shape checks against the compiled layout
    pub fn verify(&self) -> Result<(), ModelError> {
        schema::validate_schema(
            self.schema_version,
            self.schema_hash,
            &self.numeric_features,
            &self.categorical_features,
        )?;
        self.pipeline.check()
    }

    /// Write atomically: temp file in the target directory, then rename.
    /// An existing artifact is only replaced once the new one is complete.
    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        let io_err = |source| ModelError::Io {
            path: path.display().to_string(),
            source,
        };

        let bytes = self.to_json()?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(&bytes).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(path).map_err(|e| io_err(e.error))?;

        tracing::info!(path = %path.display(), bytes = bytes.len(), "model artifact saved");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let bytes = std::fs::read(path).map_err(|source| ModelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&bytes)
    }
}
