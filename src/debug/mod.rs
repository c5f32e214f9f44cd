//! Debug bundle writer for inspecting a fit run offline.
//!
//! Writes a timestamped markdown file with the dataset stats, row errors,
//! and the full per-group fit table. Useful when a fit looks wrong and the
//! terminal summary is not enough.

use std::fs::{create_dir_all, File};
use std::io::Write;
use std::path::PathBuf;

use chrono::Local;

use crate::app::pipeline::RunOutput;
use crate::domain::FitConfig;
use crate::error::AppError;

/// Row errors listed in full before truncation.
const MAX_ROW_ERRORS: usize = 20;

pub fn write_debug_bundle(run: &RunOutput, config: &FitConfig) -> Result<PathBuf, AppError> {
    let dir = PathBuf::from("debug");
    create_dir_all(&dir).map_err(|e| AppError::new(4, format!("Failed to create debug dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("lut_debug_{ts}.md"));

    let mut file = File::create(&path)
        .map_err(|e| AppError::new(4, format!("Failed to create debug file: {e}")))?;

    let mut write = |text: String| -> Result<(), AppError> {
        writeln!(file, "{text}").map_err(|e| AppError::new(4, format!("Failed to write debug: {e}")))
    };

    write("# lut debug bundle".to_string())?;
    write(format!("- generated: {}", Local::now().to_rfc3339()))?;
    write(format!("- csv: {}", config.csv_path.display()))?;
    write(format!(
        "- fit: {} ~ {}(time), group by {}",
        config.value.display_name(),
        config.degree.display_name(),
        config.group.display_name()
    ))?;
    write(format!(
        "- rows: read={} used={} errors={}",
        run.ingest.rows_read,
        run.ingest.rows_used,
        run.ingest.row_errors.len()
    ))?;
    write(format!(
        "- range: time=[{:.3}, {:.3}] value=[{:.6}, {:.6}]",
        run.ingest.stats.time_min,
        run.ingest.stats.time_max,
        run.ingest.stats.value_min,
        run.ingest.stats.value_max
    ))?;

    if !run.ingest.row_errors.is_empty() {
        write("\n## Row errors".to_string())?;
        for err in run.ingest.row_errors.iter().take(MAX_ROW_ERRORS) {
            write(format!("- line {}: {}", err.line, err.message))?;
        }
        if run.ingest.row_errors.len() > MAX_ROW_ERRORS {
            write(format!(
                "- ... and {} more",
                run.ingest.row_errors.len() - MAX_ROW_ERRORS
            ))?;
        }
    }

    write("\n## Fits".to_string())?;
    write("| key | n | sse | rmse | coeffs | std errors |".to_string())?;
    write("| - | - | - | - | - | - |".to_string())?;
    for fit in &run.fit_set.fits {
        write(format!(
            "| {} | {} | {:.6} | {:.6} | {} | {} |",
            fit.key,
            fit.quality.n,
            fit.quality.sse,
            fit.quality.rmse,
            fmt_vec(&fit.model.coeffs),
            fmt_vec(&fit.std_errors)
        ))?;
    }
    for (key, reason) in &run.fit_set.skipped {
        write(format!("- skipped key={key}: {reason}"))?;
    }

    Ok(path)
}

fn fmt_vec(values: &[f64]) -> String {
    if values.is_empty() {
        return "-".to_string();
    }
    let parts: Vec<String> = values.iter().map(|v| format!("{v:.6}")).collect();
    format!("[{}]", parts.join(", "))
}
