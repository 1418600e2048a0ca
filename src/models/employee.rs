//! Employee feature record

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::schema::{CATEGORICAL_COUNT, CATEGORICAL_FEATURES, NUMERIC_COUNT, NUMERIC_FEATURES};

/// One employee's input to the model. Field names on the wire (and in the
/// training CSV header) are the PascalCase column names from `schema`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct EmployeeFeatures {
    pub age: i64,
    #[validate(range(min = 0.0))]
    pub monthly_income: f64,
    #[validate(range(min = 0))]
    pub distance_from_home: i64,
    #[validate(range(min = 0))]
    pub num_companies_worked: i64,
    #[validate(range(min = 0))]
    pub total_working_years: i64,
    #[validate(range(min = 0))]
    pub years_at_company: i64,
    #[validate(range(min = 0))]
    pub years_in_current_role: i64,
    #[validate(range(min = 0))]
    pub years_since_last_promotion: i64,
    #[validate(range(min = 0))]
    pub years_with_curr_manager: i64,
    #[validate(range(min = 1, max = 4))]
    pub environment_satisfaction: i64,
    #[validate(range(min = 1, max = 4))]
    pub job_satisfaction: i64,
    #[validate(range(min = 1, max = 4))]
    pub work_life_balance: i64,
    #[validate(range(min = 1, max = 4))]
    pub relationship_satisfaction: i64,
    #[validate(range(min = 1, max = 4))]
    pub job_involvement: i64,

    pub department: String,      // "Sales"
    pub job_role: String,        // "Sales Executive"
    pub business_travel: String, // "Travel_Rarely"
    pub marital_status: String,  // "Single"
    pub over_time: String,       // "Yes" | "No"
    pub gender: String,          // "Male" | "Female"
}

impl EmployeeFeatures {
    /// Look up a numeric column by its schema name
    pub fn numeric(&self, column: &str) -> Option<f64> {
        let value = match column {
            "Age" => self.age as f64,
            "MonthlyIncome" => self.monthly_income,
            "DistanceFromHome" => self.distance_from_home as f64,
            "NumCompaniesWorked" => self.num_companies_worked as f64,
            "TotalWorkingYears" => self.total_working_years as f64,
            "YearsAtCompany" => self.years_at_company as f64,
            "YearsInCurrentRole" => self.years_in_current_role as f64,
            "YearsSinceLastPromotion" => self.years_since_last_promotion as f64,
            "YearsWithCurrManager" => self.years_with_curr_manager as f64,
            "EnvironmentSatisfaction" => self.environment_satisfaction as f64,
            "JobSatisfaction" => self.job_satisfaction as f64,
            "WorkLifeBalance" => self.work_life_balance as f64,
            "RelationshipSatisfaction" => self.relationship_satisfaction as f64,
            "JobInvolvement" => self.job_involvement as f64,
            _ => return None,
        };
        Some(value)
    }

    /// Look up a categorical column by its schema name
    pub fn categorical(&self, column: &str) -> Option<&str> {
        let value = match column {
            "Department" => &self.department,
            "JobRole" => &self.job_role,
            "BusinessTravel" => &self.business_travel,
            "MaritalStatus" => &self.marital_status,
            "OverTime" => &self.over_time,
            "Gender" => &self.gender,
            _ => return None,
        };
        Some(value.as_str())
    }

    /// Numeric values in `NUMERIC_FEATURES` order
    pub fn numeric_values(&self) -> [f64; NUMERIC_COUNT] {
        let mut values = [0.0; NUMERIC_COUNT];
        for (slot, column) in values.iter_mut().zip(NUMERIC_FEATURES) {
            *slot = self.numeric(column).unwrap_or_default();
        }
        values
    }

    /// Categorical values in `CATEGORICAL_FEATURES` order
    pub fn categorical_values(&self) -> [&str; CATEGORICAL_COUNT] {
        let mut values = [""; CATEGORICAL_COUNT];
        for (slot, column) in values.iter_mut().zip(CATEGORICAL_FEATURES) {
            *slot = self.categorical(column).unwrap_or_default();
        }
        values
    }
}
