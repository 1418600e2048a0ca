//! Prediction request/response models

use serde::{Deserialize, Serialize};

use super::EmployeeFeatures;

/// Percent at or above which a prediction is `High`
pub const HIGH_RISK_PERCENT: f64 = 60.0;

/// Percent at or above which a prediction is `Medium`
pub const MEDIUM_RISK_PERCENT: f64 = 30.0;

/// Largest batch accepted by `/predict/batch`
pub const MAX_BATCH_SIZE: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskBucket {
    Low,
    Medium,
    High,
}

impl RiskBucket {
    /// Closed lower bounds, checked from the top: `>= 60` High, `>= 30` Medium, else Low
    pub fn from_percent(risk_percent: f64) -> Self {
        if risk_percent >= HIGH_RISK_PERCENT {
            Self::High
        } else if risk_percent >= MEDIUM_RISK_PERCENT {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl std::fmt::Display for RiskBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub risk_percent: f64,
    pub risk_bucket: RiskBucket,
    pub reasons: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct BatchPredictionRequest {
    pub employees: Vec<EmployeeFeatures>,
}

#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct BucketSummary {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl BucketSummary {
    pub fn record(&mut self, bucket: RiskBucket) {
        match bucket {
            RiskBucket::High => self.high += 1,
            RiskBucket::Medium => self.medium += 1,
            RiskBucket::Low => self.low += 1,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchPredictionResponse {
    pub predictions: Vec<PredictionResponse>,
    pub summary: BucketSummary,
}

impl FromIterator<PredictionResponse> for BatchPredictionResponse {
    fn from_iter<I: IntoIterator<Item = PredictionResponse>>(iter: I) -> Self {
        let mut summary = BucketSummary::default();
        let predictions = iter
            .into_iter()
            .inspect(|p| summary.record(p.risk_bucket))
            .collect();
        Self { predictions, summary }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_thresholds_use_closed_lower_bounds() {
        assert_eq!(RiskBucket::from_percent(0.0), RiskBucket::Low);
        assert_eq!(RiskBucket::from_percent(29.9), RiskBucket::Low);
        assert_eq!(RiskBucket::from_percent(30.0), RiskBucket::Medium);
        assert_eq!(RiskBucket::from_percent(59.9), RiskBucket::Medium);
        assert_eq!(RiskBucket::from_percent(60.0), RiskBucket::High);
        assert_eq!(RiskBucket::from_percent(100.0), RiskBucket::High);
    }

    #[test]
    fn bucket_serializes_as_label() {
        assert_eq!(serde_json::to_string(&RiskBucket::Medium).unwrap(), "\"Medium\"");
    }

    #[test]
    fn batch_summary_counts_buckets() {
        let make = |percent: f64| PredictionResponse {
            risk_percent: percent,
            risk_bucket: RiskBucket::from_percent(percent),
            reasons: vec![],
        };
        let batch: BatchPredictionResponse = [72.5, 10.0, 45.0, 61.2].into_iter().map(make).collect();

        assert_eq!(batch.predictions.len(), 4);
        assert_eq!(batch.summary, BucketSummary { high: 2, medium: 1, low: 1 });
    }
}
