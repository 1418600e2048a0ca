//! Column preprocessing
//!
//! One-hot blocks for every categorical column (in schema order), followed by
//! the numeric columns unchanged.

use std::collections::BTreeSet;

use ndarray::{Array1, Array2, ArrayViewMut1};
use serde::{Deserialize, Serialize};

use crate::models::EmployeeFeatures;
use crate::schema::{CATEGORICAL_COUNT, CATEGORICAL_FEATURES, NUMERIC_COUNT, NUMERIC_FEATURES};

use super::ModelError;

/// Per-column vocabulary learned from training data.
/// Values outside the vocabulary encode as an all-zero block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    pub categories: Vec<Vec<String>>,
}

impl OneHotEncoder {
    /// Learn sorted distinct values for each categorical column
    pub fn fit(records: &[EmployeeFeatures]) -> Self {
        let mut seen: Vec<BTreeSet<&str>> = vec![BTreeSet::new(); CATEGORICAL_COUNT];
        for record in records {
            for (set, value) in seen.iter_mut().zip(record.categorical_values()) {
                set.insert(value);
            }
        }

        let categories = seen
            .into_iter()
            .map(|set| set.into_iter().map(str::to_string).collect())
            .collect();

        Self { categories }
    }

    /// Number of one-hot output columns
    pub fn width(&self) -> usize {
        self.categories.iter().map(Vec::len).sum()
    }

    fn encode_into(&self, values: &[&str; CATEGORICAL_COUNT], mut out: ArrayViewMut1<f64>) {
        let mut offset = 0;
        for (vocabulary, value) in self.categories.iter().zip(values) {
            // vocabulary is sorted at fit time
            if let Ok(pos) = vocabulary.binary_search_by(|c| c.as_str().cmp(*value)) {
                out[offset + pos] = 1.0;
            }
            offset += vocabulary.len();
        }
    }

    pub fn check(&self) -> Result<(), ModelError> {
        if self.categories.len() != CATEGORICAL_COUNT {
            return Err(ModelError::Shape(format!(
                "encoder has {} categorical columns, schema has {}",
                self.categories.len(),
                CATEGORICAL_COUNT
            )));
        }
        for (column, vocabulary) in CATEGORICAL_FEATURES.iter().zip(&self.categories) {
            if vocabulary.windows(2).any(|w| w[0] >= w[1]) {
                return Err(ModelError::Shape(format!(
                    "vocabulary for {column} is not sorted and distinct"
                )));
            }
        }
        Ok(())
    }
}

/// One-hot + passthrough transform producing the model's design matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preprocessor {
    pub encoder: OneHotEncoder,
}

impl Preprocessor {
    pub fn fit(records: &[EmployeeFeatures]) -> Self {
        Self {
            encoder: OneHotEncoder::fit(records),
        }
    }

    /// Total output columns
    pub fn width(&self) -> usize {
        self.encoder.width() + NUMERIC_COUNT
    }

    pub fn transform_one(&self, record: &EmployeeFeatures) -> Array1<f64> {
        let mut row = Array1::zeros(self.width());
        self.fill_row(record, row.view_mut());
        row
    }

    pub fn transform(&self, records: &[EmployeeFeatures]) -> Array2<f64> {
        let mut matrix = Array2::zeros((records.len(), self.width()));
        for (record, row) in records.iter().zip(matrix.rows_mut()) {
            self.fill_row(record, row);
        }
        matrix
    }

    fn fill_row(&self, record: &EmployeeFeatures, mut row: ArrayViewMut1<f64>) {
        let one_hot = self.encoder.width();
        self.encoder
            .encode_into(&record.categorical_values(), row.slice_mut(ndarray::s![..one_hot]));
        for (i, value) in record.numeric_values().into_iter().enumerate() {
            row[one_hot + i] = value;
        }
    }

    /// Output column names, `Department=Sales` style for one-hot columns
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.width());
        for (column, vocabulary) in CATEGORICAL_FEATURES.iter().zip(&self.encoder.categories) {
            names.extend(vocabulary.iter().map(|value| format!("{column}={value}")));
        }
        names.extend(NUMERIC_FEATURES.iter().map(|s| s.to_string()));
        names
    }
}
