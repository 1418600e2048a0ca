//! Feature Schema - Centralized Column Definition
//!
//! **This file controls the column layout shared by the trainer and the service.**
//!
//! ## Rules:
//! 1. Add a column → increment SCHEMA_VERSION
//! 2. Change order → increment SCHEMA_VERSION
//! 3. Remove a column → increment SCHEMA_VERSION
//!
//! The artifact records the version and layout hash it was trained with;
//! the service refuses to load an artifact whose layout differs.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// SCHEMA VERSION
// ============================================================================

/// Current schema version
pub const SCHEMA_VERSION: u8 = 1;

// ============================================================================
// COLUMN LAYOUT (Authoritative source)
// ============================================================================

/// Numeric columns, passed through to the model unchanged
pub const NUMERIC_FEATURES: &[&str] = &[
    "Age",
    "MonthlyIncome",
    "DistanceFromHome",
    "NumCompaniesWorked",
    "TotalWorkingYears",
    "YearsAtCompany",
    "YearsInCurrentRole",
    "YearsSinceLastPromotion",
    "YearsWithCurrManager",
    "EnvironmentSatisfaction", // 1-4
    "JobSatisfaction",         // 1-4
    "WorkLifeBalance",         // 1-4
    "RelationshipSatisfaction", // 1-4
    "JobInvolvement",          // 1-4
];

/// Categorical columns, one-hot encoded
pub const CATEGORICAL_FEATURES: &[&str] = &[
    "Department",
    "JobRole",
    "BusinessTravel",
    "MaritalStatus",
    "OverTime",
    "Gender",
];

pub const NUMERIC_COUNT: usize = 14;
pub const CATEGORICAL_COUNT: usize = 6;

/// Label column in the training CSV
pub const LABEL_COLUMN: &str = "Attrition";

/// Label value mapped to the positive class
pub const POSITIVE_LABEL: &str = "Yes";

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 over the version and both ordered column lists
pub fn schema_hash() -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[SCHEMA_VERSION]);

    for name in CATEGORICAL_FEATURES {
        hasher.update(b"cat:");
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }
    for name in NUMERIC_FEATURES {
        hasher.update(b"num:");
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }

    hasher.finalize()
}

// ============================================================================
// SCHEMA INFO
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaInfo {
    pub version: u8,
    pub hash: u32,
    pub numeric_features: Vec<String>,
    pub categorical_features: Vec<String>,
}

impl SchemaInfo {
    pub fn current() -> Self {
        Self {
            version: SCHEMA_VERSION,
            hash: schema_hash(),
            numeric_features: NUMERIC_FEATURES.iter().map(|s| s.to_string()).collect(),
            categorical_features: CATEGORICAL_FEATURES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

// ============================================================================
// SCHEMA VALIDATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "feature schema mismatch: expected v{expected_version} (hash {expected_hash:08x}), \
     artifact has v{actual_version} (hash {actual_hash:08x})"
)]
pub struct SchemaMismatchError {
    pub expected_version: u8,
    pub expected_hash: u32,
    pub actual_version: u8,
    pub actual_hash: u32,
}

/// Check a stored schema (version, hash and column lists) against the compiled one
pub fn validate_schema(
    version: u8,
    hash: u32,
    numeric: &[String],
    categorical: &[String],
) -> Result<(), SchemaMismatchError> {
    let current = schema_hash();
    let lists_match = numeric.iter().map(String::as_str).eq(NUMERIC_FEATURES.iter().copied())
        && categorical.iter().map(String::as_str).eq(CATEGORICAL_FEATURES.iter().copied());

    if version != SCHEMA_VERSION || hash != current || !lists_match {
        return Err(SchemaMismatchError {
            expected_version: SCHEMA_VERSION,
            expected_hash: current,
            actual_version: version,
            actual_hash: hash,
        });
    }

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
