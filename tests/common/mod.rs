#![allow(dead_code)]

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};

use attrition_risk::config::Config;
use attrition_risk::training::{self, TrainConfig};
use attrition_risk::{AppState, Predictor};

const HEADER: &str = "Age,Attrition,BusinessTravel,DailyRate,Department,DistanceFromHome,EnvironmentSatisfaction,Gender,JobInvolvement,JobRole,JobSatisfaction,MaritalStatus,MonthlyIncome,NumCompaniesWorked,OverTime,RelationshipSatisfaction,TotalWorkingYears,WorkLifeBalance,YearsAtCompany,YearsInCurrentRole,YearsSinceLastPromotion,YearsWithCurrManager";

const DEPARTMENTS: [&str; 3] = ["Human Resources", "Research & Development", "Sales"];
const ROLES: [&str; 3] = ["Laboratory Technician", "Research Scientist", "Sales Executive"];
const TRAVEL: [&str; 3] = ["Non-Travel", "Travel_Frequently", "Travel_Rarely"];
const MARITAL: [&str; 3] = ["Divorced", "Married", "Single"];

fn pick<'a>(rng: &mut StdRng, options: &[&'a str]) -> &'a str {
    options[rng.gen_range(0..options.len())]
}

/// HR-style CSV where overtime and low job satisfaction drive attrition
pub fn write_training_csv(path: &Path, rows: usize, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut text = String::from(HEADER);

    for _ in 0..rows {
        let age: i64 = rng.gen_range(18..60);
        let job_satisfaction: i64 = rng.gen_range(1..=4);
        let overtime = rng.gen_bool(0.3);
        let z = -2.0 + if overtime { 2.0 } else { 0.0 } - 0.6 * (job_satisfaction as f64 - 2.5)
            - 0.04 * (age as f64 - 38.0);
        let left = rng.gen_bool(1.0 / (1.0 + (-z).exp()));

        write!(
            text,
            "\n{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            age,
            if left { "Yes" } else { "No" },
            pick(&mut rng, &TRAVEL),
            rng.gen_range(100..1500),
            pick(&mut rng, &DEPARTMENTS),
            rng.gen_range(1..30),
            rng.gen_range(1..=4),
            if rng.gen_bool(0.5) { "Male" } else { "Female" },
            rng.gen_range(1..=4),
            pick(&mut rng, &ROLES),
            job_satisfaction,
            pick(&mut rng, &MARITAL),
            rng.gen_range(1000..20000),
            rng.gen_range(0..10),
            if overtime { "Yes" } else { "No" },
            rng.gen_range(1..=4),
            rng.gen_range(0..40),
            rng.gen_range(1..=4),
            rng.gen_range(0..20),
            rng.gen_range(0..15),
            rng.gen_range(0..15),
            rng.gen_range(0..15),
        )
        .unwrap();
    }

    std::fs::write(path, text).unwrap();
}

/// Train on a synthetic CSV inside `dir`, returning the artifact path
pub fn train_artifact(dir: &Path) -> PathBuf {
    let data_path = dir.join("hr.csv");
    let output_path = dir.join("attrition_model.json");
    write_training_csv(&data_path, 500, 17);

    let config = TrainConfig {
        data_path,
        output_path: output_path.clone(),
        ..TrainConfig::default()
    };
    training::run(&config).unwrap();
    output_path
}

pub fn app_state(dir: &Path) -> AppState {
    let model_path = train_artifact(dir);
    let predictor = Predictor::load(&model_path).unwrap();
    let config = Config {
        model_path,
        ..Config::default()
    };
    AppState::new(predictor, config)
}

/// Request body matching the first row of the IBM dataset
pub fn employee_json() -> Value {
    json!({
        "Age": 41,
        "MonthlyIncome": 5993.0,
        "DistanceFromHome": 1,
        "NumCompaniesWorked": 8,
        "TotalWorkingYears": 8,
        "YearsAtCompany": 6,
        "YearsInCurrentRole": 4,
        "YearsSinceLastPromotion": 0,
        "YearsWithCurrManager": 5,
        "EnvironmentSatisfaction": 2,
        "JobSatisfaction": 4,
        "WorkLifeBalance": 1,
        "RelationshipSatisfaction": 1,
        "JobInvolvement": 3,
        "Department": "Sales",
        "JobRole": "Sales Executive",
        "BusinessTravel": "Travel_Rarely",
        "MaritalStatus": "Single",
        "OverTime": "Yes",
        "Gender": "Female"
    })
}
