//! Rule-based risk reasons
//!
//! Fixed heuristics evaluated against the input record. They do not look at
//! the fitted coefficients, so a reason can appear even when the model weighs
//! that feature lightly.

use crate::models::EmployeeFeatures;

/// At most this many reasons are reported
pub const MAX_REASONS: usize = 3;

/// Returned alone when no rule fires
pub const NO_RISK_FACTORS: &str = "No major risk factors detected";

struct ReasonRule {
    reason: &'static str,
    applies: fn(&EmployeeFeatures) -> bool,
}

// Evaluation order is significant: only the first MAX_REASONS matches are kept.
static RULES: [ReasonRule; 6] = [
    ReasonRule {
        reason: "Low job satisfaction",
        applies: |e| e.job_satisfaction <= 2,
    },
    ReasonRule {
        reason: "Low environment satisfaction",
        applies: |e| e.environment_satisfaction <= 2,
    },
    ReasonRule {
        reason: "Poor work–life balance",
        applies: |e| e.work_life_balance <= 2,
    },
    ReasonRule {
        reason: "Many previous employers",
        applies: |e| e.num_companies_worked >= 4,
    },
    ReasonRule {
        reason: "Works frequent overtime",
        applies: |e| e.over_time == "Yes",
    },
    ReasonRule {
        reason: "Long time since last promotion",
        applies: |e| e.years_since_last_promotion >= 4,
    },
];

/// Reasons for a record, 1 to `MAX_REASONS` entries
pub fn reasons(record: &EmployeeFeatures) -> Vec<String> {
    let mut matched: Vec<String> = RULES
        .iter()
        .filter(|rule| (rule.applies)(record))
        .take(MAX_REASONS)
        .map(|rule| rule.reason.to_string())
        .collect();

    if matched.is_empty() {
        matched.push(NO_RISK_FACTORS.to_string());
    }

    matched
}
