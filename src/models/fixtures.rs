//! Shared test records

use super::EmployeeFeatures;

/// Row 1 of the IBM HR attrition dataset (an employee who left)
pub fn sample_employee() -> EmployeeFeatures {
    EmployeeFeatures {
        age: 41,
        monthly_income: 5993.0,
        distance_from_home: 1,
        num_companies_worked: 8,
        total_working_years: 8,
        years_at_company: 6,
        years_in_current_role: 4,
        years_since_last_promotion: 0,
        years_with_curr_manager: 5,
        environment_satisfaction: 2,
        job_satisfaction: 4,
        work_life_balance: 1,
        relationship_satisfaction: 1,
        job_involvement: 3,
        department: "Sales".to_string(),
        job_role: "Sales Executive".to_string(),
        business_travel: "Travel_Rarely".to_string(),
        marital_status: "Single".to_string(),
        over_time: "Yes".to_string(),
        gender: "Female".to_string(),
    }
}

/// A record on which no reason rule fires
pub fn content_employee() -> EmployeeFeatures {
    EmployeeFeatures {
        num_companies_worked: 1,
        environment_satisfaction: 4,
        job_satisfaction: 3,
        work_life_balance: 3,
        over_time: "No".to_string(),
        ..sample_employee()
    }
}
