//! fetch -> join -> adjust -> project, as one explicit entry point.

use serde::Serialize;
use tracing::{error, info};

use crate::adjust::{ProjectionModel, Projector};
use crate::config::Settings;
use crate::dataset::{ProjectedRow, RoleRecord, SkillsMap, SourceId, Tier};
use crate::error::PipelineError;
use crate::join::join;
use crate::provider::{fetch_all, DatasetProvider, Inputs};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultTable {
    pub model: ProjectionModel,
    /// Sources replaced by their built-in dataset, in fetch order.
    pub fallbacks: Vec<SourceId>,
    pub rows: Vec<ProjectedRow>,
}

/// Nearest cent, half away from zero.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Project every tier of every row; row order is kept.
pub fn project_all(
    table: &[RoleRecord],
    skills: &SkillsMap,
    projector: &Projector,
) -> Vec<ProjectedRow> {
    table
        .iter()
        .map(|record| {
            let [entry, mid, senior] =
                Tier::ALL.map(|tier| round_cents(projector.project_tier(record, tier, skills)));
            ProjectedRow {
                role: record.role.clone(),
                entry,
                mid,
                senior,
            }
        })
        .collect()
}

pub fn project_inputs(inputs: &Inputs, projector: &Projector) -> ResultTable {
    let table = join(&inputs.salary, &inputs.demand, &inputs.geographic);
    let rows = project_all(&table, &inputs.skills, projector);
    info!(rows = rows.len(), model = projector.model.as_str(), "projected salaries");
    ResultTable {
        model: projector.model,
        fallbacks: inputs.fallbacks.clone(),
        rows,
    }
}

/// Run the whole projection once.
///
/// Under the fail-fast policy a failed fetch aborts the live run and the
/// pipeline restarts once on the built-in datasets for all four sources.
pub fn run(
    settings: &Settings,
    provider: &dyn DatasetProvider,
) -> Result<ResultTable, PipelineError> {
    settings.validate()?;
    let projector = Projector::from_settings(settings);
    let inputs = match fetch_all(provider, settings.fallback_policy) {
        Ok(inputs) => inputs,
        Err(PipelineError::RunAborted(cause)) => {
            error!(error = %cause, "run aborted; restarting on built-in datasets");
            Inputs::defaults()
        }
        Err(e) => return Err(e),
    };
    Ok(project_inputs(&inputs, &projector))
}
