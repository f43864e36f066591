//! Built-in datasets substituted when a source cannot be fetched.

use crate::dataset::{DemandFactor, GeographicFactor, SalaryBand, SkillsMap};

pub fn salary_bands() -> Vec<SalaryBand> {
    vec![
        band("Data Analyst", 70_000.0, 95_000.0, 120_000.0),
        band("Data Scientist", 90_000.0, 120_000.0, 150_000.0),
    ]
}

pub fn demand_factors() -> Vec<DemandFactor> {
    vec![
        DemandFactor {
            role: "Data Analyst".into(),
            factor: 0.1,
        },
        DemandFactor {
            role: "Data Scientist".into(),
            factor: 0.12,
        },
    ]
}

pub fn geographic_factors() -> Vec<GeographicFactor> {
    vec![
        GeographicFactor {
            role: "Data Analyst".into(),
            factor: 0.05,
        },
        GeographicFactor {
            role: "Data Scientist".into(),
            factor: 0.07,
        },
    ]
}

pub fn skills_premiums() -> SkillsMap {
    [("Python", 0.05), ("SQL", 0.03), ("MachineLearning", 0.02)]
        .into_iter()
        .map(|(skill, rate)| (skill.to_string(), rate))
        .collect()
}

fn band(role: &str, entry: f64, mid: f64, senior: f64) -> SalaryBand {
    SalaryBand {
        role: role.to_string(),
        entry,
        mid,
        senior,
    }
}
