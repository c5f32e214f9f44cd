//! Residual computation and terminal report formatting.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::data::GroupSet;
use crate::domain::{FitConfig, GroupFit, GroupSeries};
use crate::error::AppError;
use crate::fit::GroupFitSet;
use crate::io::ingest::IngestedData;
use crate::models::predict;

/// One observation with its fitted value.
#[derive(Debug, Clone)]
pub struct PointResidual {
    pub key: i64,
    pub time: f64,
    pub y_obs: f64,
    pub y_fit: f64,
    pub residual: f64,
}

/// Compute fitted values and residuals for every point in every fitted group.
pub fn compute_residuals(
    groups: &[GroupSeries],
    fit_set: &GroupFitSet,
) -> Result<Vec<PointResidual>, AppError> {
    let mut out = Vec::new();
    for group in groups {
        let Some(fit) = fit_set.fit_for_key(group.key) else {
            continue;
        };
        for (&t, &y_obs) in group.times.iter().zip(group.values.iter()) {
            let y_fit = predict(&fit.model.coeffs, t);
            if !y_fit.is_finite() {
                return Err(AppError::new(
                    4,
                    "Non-finite model prediction during residual computation.",
                ));
            }
            out.push(PointResidual {
                key: group.key,
                time: t,
                y_obs,
                y_fit,
                residual: y_obs - y_fit,
            });
        }
    }
    Ok(out)
}

/// Groups with the worst fit quality (highest RMSE first).
pub fn rank_worst_fits(fits: &[GroupFit], top_n: usize) -> Vec<GroupFit> {
    let mut sorted = fits.to_vec();
    sorted.sort_by(|a, b| {
        b.quality
            .rmse
            .partial_cmp(&a.quality.rmse)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    sorted.into_iter().take(top_n).collect()
}

/// Format the full run summary (dataset stats + grouping + fit diagnostics).
pub fn format_run_summary(
    ingest: &IngestedData,
    group_set: &GroupSet,
    fit_set: &GroupFitSet,
    config: &FitConfig,
) -> String {
    let mut out = String::new();

    out.push_str("=== lut - lookup-table curve fit ===\n");
    out.push_str(&format!("CSV: {}\n", config.csv_path.display()));
    out.push_str(&format!(
        "Fit: {} ~ {}(time) | group by {}\n",
        config.value.display_name(),
        config.degree.display_name(),
        config.group.display_name(),
    ));
    out.push_str(&format!(
        "Rows: read={} used={} errors={}\n",
        ingest.rows_read,
        ingest.rows_used,
        ingest.row_errors.len()
    ));
    out.push_str(&format!(
        "Range: time=[{:.2}, {:.2}] | value=[{:.4}, {:.4}]\n",
        ingest.stats.time_min,
        ingest.stats.time_max,
        ingest.stats.value_min,
        ingest.stats.value_max
    ));
    out.push_str(&format!(
        "Groups: {} fitted, {} skipped",
        fit_set.fits.len(),
        fit_set.skipped.len()
    ));
    if group_set.rows_without_key > 0 {
        out.push_str(&format!(
            " ({} rows lacked the `{}` column)",
            group_set.rows_without_key,
            config.group.display_name()
        ));
    }
    out.push('\n');

    for (key, reason) in &fit_set.skipped {
        out.push_str(&format!("  (skipped key={key}) {reason}\n"));
    }

    out
}

/// Format the per-group coefficient table.
pub fn format_fit_table(fits: &[GroupFit]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:>8} {:>5} {:>12} {:>12}  {}\n",
        "key", "n", "sse", "rmse", "coeffs (c0..cd) [std err]"
    ));

    for fit in fits {
        let coeffs = fit
            .model
            .coeffs
            .iter()
            .enumerate()
            .map(|(idx, c)| match fit.std_errors.get(idx) {
                Some(se) => format!("{c:.6} [{se:.2e}]"),
                None => format!("{c:.6}"),
            })
            .collect::<Vec<_>>()
            .join(", ");

        out.push_str(&format!(
            "{:>8} {:>5} {:>12.4} {:>12.6}  {}\n",
            fit.key, fit.quality.n, fit.quality.sse, fit.quality.rmse, coeffs
        ));
    }

    out
}

/// Format the worst-fit ranking.
pub fn format_rankings(fits: &[GroupFit], top_n: usize) -> String {
    let worst = rank_worst_fits(fits, top_n);

    let mut out = String::new();
    out.push_str(&format!("Worst fits (top {} by RMSE):\n", worst.len()));
    out.push_str(&format_fit_table(&worst));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Degree, FitQuality, PolyModel};

    fn fit(key: i64, rmse: f64) -> GroupFit {
        GroupFit {
            key,
            model: PolyModel {
                degree: Degree::Quadratic,
                coeffs: vec![100.0, 0.0, 0.0],
            },
            quality: FitQuality {
                sse: rmse * rmse,
                rmse,
                n: 5,
            },
            std_errors: vec![],
        }
    }

    #[test]
    fn compute_residuals_basic() {
        let groups = vec![GroupSeries {
            key: 7,
            times: vec![1.0, 2.0],
            values: vec![100.0, 101.0],
        }];
        let fit_set = GroupFitSet {
            fits: vec![fit(7, 0.0)],
            skipped: vec![],
        };

        let residuals = compute_residuals(&groups, &fit_set).unwrap();
        assert_eq!(residuals.len(), 2);
        assert!((residuals[0].residual - 0.0).abs() < 1e-12);
        assert!((residuals[1].residual - 1.0).abs() < 1e-12);
        assert_eq!(residuals[0].key, 7);
    }

    #[test]
    fn skipped_groups_produce_no_residuals() {
        let groups = vec![
            GroupSeries {
                key: 1,
                times: vec![1.0],
                values: vec![100.0],
            },
            GroupSeries {
                key: 2,
                times: vec![1.0, 2.0],
                values: vec![100.0, 100.0],
            },
        ];
        let fit_set = GroupFitSet {
            fits: vec![fit(2, 0.0)],
            skipped: vec![(1, "Underdetermined".to_string())],
        };

        let residuals = compute_residuals(&groups, &fit_set).unwrap();
        assert!(residuals.iter().all(|r| r.key == 2));
    }

    #[test]
    fn rank_worst_fits_orders_by_rmse() {
        let fits = vec![fit(1, 0.5), fit(2, 2.0), fit(3, 1.0)];
        let worst = rank_worst_fits(&fits, 2);
        assert_eq!(worst.len(), 2);
        assert_eq!(worst[0].key, 2);
        assert_eq!(worst[1].key, 3);
    }
}
