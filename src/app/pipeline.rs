//! Shared "fit pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! CSV ingest -> grouping -> per-group fit -> residuals
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use crate::data::{group_rows, GroupSet};
use crate::domain::FitConfig;
use crate::error::AppError;
use crate::fit::{fit_groups, GroupFitSet};
use crate::io::ingest::{load_rows, IngestedData};
use crate::report::{compute_residuals, PointResidual};

/// All computed outputs of a single `lut fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedData,
    pub group_set: GroupSet,
    pub fit_set: GroupFitSet,
    pub residuals: Vec<PointResidual>,
}

/// Execute the full fitting pipeline and return the computed outputs.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, AppError> {
    let ingest = load_rows(&config.csv_path, config.value)?;
    run_fit_with_rows(config, ingest)
}

/// Execute the fitting pipeline with already-ingested rows.
///
/// This is useful for the TUI where a degree change should refit without
/// re-reading the CSV. Note: `ingest.stats` follow the value column the rows
/// were loaded with, so a *value* change requires a fresh `run_fit`.
pub fn run_fit_with_rows(config: &FitConfig, ingest: IngestedData) -> Result<RunOutput, AppError> {
    let group_set = group_rows(&ingest.rows, config.group, config.value, config.key_filter);

    if group_set.groups.is_empty() {
        let message = match config.key_filter {
            Some(key) => format!(
                "No rows with {}={key} in '{}'.",
                config.group.display_name(),
                config.csv_path.display()
            ),
            None => format!(
                "No rows usable for grouping by `{}` in '{}'.",
                config.group.display_name(),
                config.csv_path.display()
            ),
        };
        return Err(AppError::new(3, message));
    }

    let fit_set = fit_groups(&group_set.groups, config.degree)?;
    let residuals = compute_residuals(&group_set.groups, &fit_set)?;

    Ok(RunOutput {
        ingest,
        group_set,
        fit_set,
        residuals,
    })
}
