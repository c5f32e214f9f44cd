//! Read/write curve JSON files.
//!
//! Curve JSON is the "portable" representation of a run's fitted polynomials:
//! - model parameters and quality per group
//! - run metadata (value column, grouping key, degree)
//! - a precomputed fitted grid per group for quick plotting
//!
//! The schema is defined by `domain::CurveFile`.

use std::fs::File;
use std::path::Path;

use crate::domain::{CurveEntry, CurveFile, CurveGrid, FitConfig, GroupSeries};
use crate::error::AppError;
use crate::fit::GroupFitSet;
use crate::models::predict;

/// Grid points sampled per group.
const GRID_POINTS: usize = 101;

/// Write a curve JSON file covering every fitted group.
pub fn write_curve_json(
    path: &Path,
    fit_set: &GroupFitSet,
    groups: &[GroupSeries],
    config: &FitConfig,
) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create curve JSON '{}': {e}", path.display()),
        )
    })?;

    let mut curves = Vec::with_capacity(fit_set.fits.len());
    for fit in &fit_set.fits {
        let series = groups.iter().find(|g| g.key == fit.key);
        let (t_min, t_max) = series
            .and_then(|s| series_time_range(s))
            .unwrap_or((0.0, 1.0));

        let (time, value) = build_grid(&fit.model.coeffs, t_min, t_max, GRID_POINTS);
        curves.push(CurveEntry {
            key: fit.key,
            model: fit.model.clone(),
            quality: fit.quality.clone(),
            grid: CurveGrid { time, value },
        });
    }

    let curve_file = CurveFile {
        tool: "lut".to_string(),
        value: config.value,
        group: config.group,
        degree: config.degree,
        curves,
    };

    serde_json::to_writer_pretty(file, &curve_file)
        .map_err(|e| AppError::new(2, format!("Failed to write curve JSON: {e}")))?;

    Ok(())
}

/// Read a curve JSON file.
pub fn read_curve_json(path: &Path) -> Result<CurveFile, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to open curve JSON '{}': {e}", path.display()),
        )
    })?;
    let curve: CurveFile = serde_json::from_reader(file)
        .map_err(|e| AppError::new(2, format!("Invalid curve JSON: {e}")))?;
    Ok(curve)
}

fn series_time_range(series: &GroupSeries) -> Option<(f64, f64)> {
    let first = *series.times.first()?;
    let last = *series.times.last()?;
    if last > first {
        Some((first, last))
    } else {
        None
    }
}

fn build_grid(coeffs: &[f64], t_min: f64, t_max: f64, n: usize) -> (Vec<f64>, Vec<f64>) {
    let n = n.max(2);
    let mut t0 = t_min;
    let mut t1 = t_max;
    if !(t0.is_finite() && t1.is_finite()) || t1 <= t0 {
        t0 = 0.0;
        t1 = 1.0;
    }

    let mut time = Vec::with_capacity(n);
    let mut value = Vec::with_capacity(n);

    for i in 0..n {
        let u = i as f64 / (n as f64 - 1.0);
        let t = t0 + u * (t1 - t0);
        time.push(t);
        value.push(predict(coeffs, t));
    }

    (time, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_spans_series_range() {
        let (time, value) = build_grid(&[1.0, 2.0], 10.0, 20.0, 11);
        assert_eq!(time.len(), 11);
        assert!((time[0] - 10.0).abs() < 1e-12);
        assert!((time[10] - 20.0).abs() < 1e-12);
        // y = 1 + 2t
        assert!((value[0] - 21.0).abs() < 1e-12);
        assert!((value[10] - 41.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_range_falls_back() {
        let (time, _) = build_grid(&[0.0], 5.0, 5.0, 3);
        assert_eq!(time, vec![0.0, 0.5, 1.0]);
    }
}
