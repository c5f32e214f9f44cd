//! Fit every group independently, collecting skip reasons.
//!
//! Groups are independent least-squares problems, so they are evaluated in
//! parallel. Output order is deterministic (groups arrive sorted by key and
//! rayon's collect preserves order).
//!
//! A group that cannot be fitted (too few points, degenerate solve) is
//! *skipped* with a recorded reason rather than failing the run; the run only
//! fails when nothing at all could be fitted.

use rayon::prelude::*;

use crate::domain::{Degree, FitQuality, GroupFit, GroupSeries, PolyModel};
use crate::error::AppError;
use crate::fit::fitter::fit_series;

/// Fits plus skip diagnostics for one run.
#[derive(Debug, Clone)]
pub struct GroupFitSet {
    pub fits: Vec<GroupFit>,
    pub skipped: Vec<(i64, String)>,
}

impl GroupFitSet {
    /// Fit for a specific key, if that group was fitted.
    pub fn fit_for_key(&self, key: i64) -> Option<&GroupFit> {
        self.fits.iter().find(|f| f.key == key)
    }
}

/// Fit all groups at the given degree.
pub fn fit_groups(groups: &[GroupSeries], degree: Degree) -> Result<GroupFitSet, AppError> {
    if groups.is_empty() {
        return Err(AppError::new(3, "No groups to fit."));
    }

    let results: Vec<Result<GroupFit, (i64, String)>> = groups
        .par_iter()
        .map(|g| {
            fit_series(degree, &g.times, &g.values)
                .map(|fit| GroupFit {
                    key: g.key,
                    model: PolyModel {
                        degree: fit.degree,
                        coeffs: fit.coeffs,
                    },
                    quality: FitQuality {
                        sse: fit.sse,
                        rmse: fit.rmse,
                        n: g.len(),
                    },
                    std_errors: fit.std_errors,
                })
                .map_err(|e| (g.key, e.to_string()))
        })
        .collect();

    let mut fits = Vec::new();
    let mut skipped = Vec::new();
    for result in results {
        match result {
            Ok(fit) => fits.push(fit),
            Err(reason) => skipped.push(reason),
        }
    }

    if fits.is_empty() {
        return Err(AppError::new(
            3,
            format!("No group could be fitted ({} skipped).", skipped.len()),
        ));
    }

    Ok(GroupFitSet { fits, skipped })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::predict;

    fn series(key: i64, truth: &[f64], n: usize) -> GroupSeries {
        let times: Vec<f64> = (0..n).map(|i| 10.0 + i as f64 * 5.0).collect();
        let values = times.iter().map(|&t| predict(truth, t)).collect();
        GroupSeries {
            key,
            times,
            values,
        }
    }

    #[test]
    fn fits_all_groups_in_key_order() {
        let groups = vec![
            series(2, &[1.0, 0.5, 0.01], 8),
            series(5, &[3.0, -0.2, 0.02], 8),
        ];

        let set = fit_groups(&groups, Degree::Quadratic).unwrap();
        assert_eq!(set.fits.len(), 2);
        assert_eq!(set.fits[0].key, 2);
        assert_eq!(set.fits[1].key, 5);
        assert!(set.skipped.is_empty());
        assert!(set.fits.iter().all(|f| f.quality.rmse < 1e-6));
    }

    #[test]
    fn small_group_is_skipped_not_fatal() {
        let groups = vec![
            series(1, &[1.0, 0.5, 0.01], 8),
            GroupSeries {
                key: 9,
                times: vec![10.0, 20.0],
                values: vec![1.0, 2.0],
            },
        ];

        let set = fit_groups(&groups, Degree::Quadratic).unwrap();
        assert_eq!(set.fits.len(), 1);
        assert_eq!(set.skipped.len(), 1);
        assert_eq!(set.skipped[0].0, 9);
        assert!(set.skipped[0].1.contains("Underdetermined"));
        assert!(set.fit_for_key(9).is_none());
        assert!(set.fit_for_key(1).is_some());
    }

    #[test]
    fn all_groups_skipped_is_an_error() {
        let groups = vec![GroupSeries {
            key: 0,
            times: vec![1.0],
            values: vec![1.0],
        }];

        let err = fit_groups(&groups, Degree::Quadratic).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
