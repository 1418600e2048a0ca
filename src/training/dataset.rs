//! Labelled training data from CSV

use std::io;
use std::path::Path;

use crate::models::EmployeeFeatures;
use crate::schema::{CATEGORICAL_FEATURES, LABEL_COLUMN, NUMERIC_FEATURES, POSITIVE_LABEL};

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("failed to read CSV header: {0}")]
    Header(#[source] csv::Error),

    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("line {line}: {source}")]
    Row {
        line: u64,
        #[source]
        source: csv::Error,
    },

    #[error("line {line}: {column} is not a finite number")]
    NonFinite { line: u64, column: &'static str },

    #[error("dataset contains no rows")]
    Empty,

    #[error("dataset has no {0} examples; both classes are required")]
    MissingClass(&'static str),
}

/// Feature records with 0/1 attrition labels, row-aligned
#[derive(Debug, Clone, Default)]
pub struct LabeledData {
    pub records: Vec<EmployeeFeatures>,
    pub labels: Vec<u8>,
}

impl LabeledData {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn positives(&self) -> usize {
        self.labels.iter().filter(|&&y| y == 1).count()
    }

    pub fn positive_rate(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.positives() as f64 / self.len() as f64
        }
    }

    /// Rows at the given indices, in index order
    pub fn select(&self, indices: &[usize]) -> LabeledData {
        LabeledData {
            records: indices.iter().map(|&i| self.records[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
        }
    }
}

/// `"Yes"` is the positive class; every other value is negative
pub fn encode_label(value: &str) -> u8 {
    u8::from(value == POSITIVE_LABEL)
}

pub fn load_csv(path: &Path) -> Result<LabeledData, DatasetError> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| DatasetError::Open {
            path: path.display().to_string(),
            source,
        })?;
    read(reader)
}

pub fn from_reader<R: io::Read>(rdr: R) -> Result<LabeledData, DatasetError> {
    let reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    read(reader)
}

fn read<R: io::Read>(mut reader: csv::Reader<R>) -> Result<LabeledData, DatasetError> {
    let headers = reader.headers().map_err(DatasetError::Header)?.clone();

    let missing: Vec<String> = NUMERIC_FEATURES
        .iter()
        .chain(CATEGORICAL_FEATURES)
        .chain(std::iter::once(&LABEL_COLUMN))
        .filter(|column| !headers.iter().any(|h| h == **column))
        .map(|column| column.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(DatasetError::MissingColumns(missing));
    }

    let label_index = headers
        .iter()
        .position(|h| h == LABEL_COLUMN)
        .ok_or_else(|| DatasetError::MissingColumns(vec![LABEL_COLUMN.to_string()]))?;

    let mut data = LabeledData::default();
    for result in reader.records() {
        let row = result.map_err(|source| DatasetError::Row {
            line: source.position().map(|p| p.line()).unwrap_or_default(),
            source,
        })?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();

        let record: EmployeeFeatures = row
            .deserialize(Some(&headers))
            .map_err(|source| DatasetError::Row { line, source })?;
        // csv parses "NaN" and "inf" as valid floats
        if let Some(column) = NUMERIC_FEATURES
            .iter()
            .find(|column| !record.numeric(column).is_some_and(f64::is_finite))
        {
            return Err(DatasetError::NonFinite { line, column: *column });
        }
        let label = encode_label(row.get(label_index).unwrap_or_default());

        data.records.push(record);
        data.labels.push(label);
    }

    if data.is_empty() {
        return Err(DatasetError::Empty);
    }
    match data.positives() {
        0 => return Err(DatasetError::MissingClass("positive")),
        p if p == data.len() => return Err(DatasetError::MissingClass("negative")),
        _ => {}
    }

    tracing::info!(
        rows = data.len(),
        positives = data.positives(),
        "training data loaded"
    );
    Ok(data)
}
