//! Export per-point results to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::FitConfig;
use crate::error::AppError;
use crate::report::PointResidual;

/// Write per-point results to a CSV file.
pub fn write_results_csv(
    path: &Path,
    residuals: &[PointResidual],
    config: &FitConfig,
) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create export CSV '{}': {e}", path.display()),
        )
    })?;

    writeln!(
        file,
        "group_key,time,value_column,degree,y_obs,y_fit,residual"
    )
    .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    let value_name = format!("{:?}", config.value).to_lowercase();
    for r in residuals {
        writeln!(
            file,
            "{},{},{},{},{:.10},{:.10},{:.10}",
            r.key,
            r.time,
            value_name,
            config.degree.order(),
            r.y_obs,
            r.y_fit,
            r.residual,
        )
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}
