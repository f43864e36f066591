//! Adjustment models that turn a current-year figure into a next-year figure.
//!
//! The default chain applies inflation, then the skills premium, then the
//! demand/geographic uplift. Each step multiplies the previous result; the
//! three multipliers are never fused into one factor, so the floating-point
//! result is the same as applying the steps by hand in that order.

use serde::{Deserialize, Serialize};

use crate::config::{Settings, TierValues};
use crate::dataset::{total_premium, RoleRecord, SkillsMap, Tier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectionModel {
    /// inflation -> skills premium -> demand/geographic
    #[default]
    Chain,
    /// Fixed linear formula, used instead of the chain.
    Regression,
    /// The chain with a per-tier compound growth rate added to inflation.
    HistoricalGrowth,
}

impl ProjectionModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectionModel::Chain => "chain",
            ProjectionModel::Regression => "regression",
            ProjectionModel::HistoricalGrowth => "historical-growth",
        }
    }
}

pub fn inflation_adjustment(salary: f64, inflation_rate: f64) -> f64 {
    salary * (1.0 + inflation_rate)
}

/// The premium total is summed on every call.
pub fn skills_premium_adjustment(salary: f64, skills: &SkillsMap) -> f64 {
    salary * (1.0 + total_premium(skills))
}

pub fn demand_geographic_adjustment(
    salary: f64,
    demand_factor: f64,
    geographic_factor: f64,
) -> f64 {
    salary * (1.0 + demand_factor + geographic_factor)
}

pub fn weighted_regression(
    base_salary: f64,
    experience: f64,
    skills_total: f64,
    location_factor: f64,
) -> f64 {
    base_salary + 10_000.0 * experience + 20_000.0 * skills_total + 30_000.0 * location_factor
}

/// Compound annual growth rate from `present` to `future` over `years`.
pub fn calculate_cagr(future: f64, present: f64, years: f64) -> f64 {
    (future / present).powf(1.0 / years) - 1.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustmentStep {
    Inflation,
    SkillsPremium,
    DemandGeographic,
}

impl AdjustmentStep {
    /// Application order of the default chain.
    pub const CHAIN: [AdjustmentStep; 3] = [
        AdjustmentStep::Inflation,
        AdjustmentStep::SkillsPremium,
        AdjustmentStep::DemandGeographic,
    ];

    pub fn apply(&self, salary: f64, inputs: &ChainInputs<'_>) -> f64 {
        match self {
            AdjustmentStep::Inflation => inflation_adjustment(salary, inputs.inflation_rate),
            AdjustmentStep::SkillsPremium => skills_premium_adjustment(salary, inputs.skills),
            AdjustmentStep::DemandGeographic => demand_geographic_adjustment(
                salary,
                inputs.demand_factor,
                inputs.geographic_factor,
            ),
        }
    }
}

/// Per-role and run-wide values the chain steps read.
#[derive(Debug, Clone, Copy)]
pub struct ChainInputs<'a> {
    pub demand_factor: f64,
    pub geographic_factor: f64,
    pub skills: &'a SkillsMap,
    pub inflation_rate: f64,
}

/// The chain, with every intermediate figure in application order.
pub fn project_traced(
    figure: f64,
    demand_factor: f64,
    geographic_factor: f64,
    skills: &SkillsMap,
    inflation_rate: f64,
) -> [(AdjustmentStep, f64); 3] {
    let inputs = ChainInputs {
        demand_factor,
        geographic_factor,
        skills,
        inflation_rate,
    };
    let mut salary = figure;
    AdjustmentStep::CHAIN.map(|step| {
        salary = step.apply(salary, &inputs);
        (step, salary)
    })
}

/// Final figure of [`project_traced`], unrounded.
pub fn project(
    figure: f64,
    demand_factor: f64,
    geographic_factor: f64,
    skills: &SkillsMap,
    inflation_rate: f64,
) -> f64 {
    let [.., (_, adjusted)] =
        project_traced(figure, demand_factor, geographic_factor, skills, inflation_rate);
    adjusted
}

/// A selected model together with the run-wide parameters it needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Projector {
    pub model: ProjectionModel,
    pub inflation_rate: f64,
    pub experience: TierValues,
    pub prior_ratio: TierValues,
}

impl Projector {
    pub fn from_settings(settings: &Settings) -> Self {
        Projector {
            model: settings.model,
            inflation_rate: settings.inflation_rate,
            experience: settings.regression.experience,
            prior_ratio: settings.growth.prior_ratio,
        }
    }

    pub fn project_tier(&self, record: &RoleRecord, tier: Tier, skills: &SkillsMap) -> f64 {
        let figure = record.figure(tier);
        match self.model {
            ProjectionModel::Chain => project(
                figure,
                record.demand_factor,
                record.geographic_factor,
                skills,
                self.inflation_rate,
            ),
            ProjectionModel::Regression => weighted_regression(
                figure,
                self.experience.get(tier),
                total_premium(skills),
                record.geographic_factor,
            ),
            ProjectionModel::HistoricalGrowth => {
                let prior = figure * self.prior_ratio.get(tier);
                let growth = if prior > 0.0 {
                    calculate_cagr(figure, prior, 1.0)
                } else {
                    0.0
                };
                project(
                    figure,
                    record.demand_factor,
                    record.geographic_factor,
                    skills,
                    self.inflation_rate + growth,
                )
            }
        }
    }
}
