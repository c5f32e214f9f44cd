//! Low-level fitting routine for a single series.
//!
//! Given times `t_i` and observed values `y_i`, we solve an ordinary least
//! squares problem over a Vandermonde design matrix to find the polynomial
//! coefficients with minimal SSE, then derive RMSE and per-coefficient
//! standard errors from the covariance `sigma^2 (X^T X)^-1`.
//!
//! The covariance itself is not kept beyond this function; only the standard
//! errors survive into reports.

use nalgebra::{DMatrix, DVector};

use crate::domain::Degree;
use crate::error::AppError;
use crate::math::{coefficient_covariance, solve_least_squares};
use crate::models::{fill_design_row, predict};

/// Fit output for one series.
#[derive(Debug, Clone)]
pub struct ModelFit {
    pub degree: Degree,
    pub coeffs: Vec<f64>,
    pub sse: f64,
    pub rmse: f64,
    /// Empty when the fit is saturated or the normal matrix is singular.
    pub std_errors: Vec<f64>,
}

/// Fit a polynomial of the given degree to `(times, values)`.
pub fn fit_series(degree: Degree, times: &[f64], values: &[f64]) -> Result<ModelFit, AppError> {
    let n = times.len();
    let p = degree.coeff_len();

    if n != values.len() {
        return Err(AppError::new(4, "Times/values length mismatch."));
    }
    if n == 0 {
        return Err(AppError::new(3, "No data points to fit."));
    }
    if n < p {
        return Err(AppError::new(
            3,
            format!("Underdetermined: n={n} < {p} coefficients."),
        ));
    }
    if times.iter().any(|t| !t.is_finite()) || values.iter().any(|v| !v.is_finite()) {
        return Err(AppError::new(3, "Non-finite time or value in series."));
    }

    // Build the design matrix X and observation vector y.
    let mut x = DMatrix::<f64>::zeros(n, p);
    let mut y = DVector::<f64>::zeros(n);
    let mut row = vec![0.0; p];

    for i in 0..n {
        fill_design_row(degree, times[i], &mut row);
        for j in 0..p {
            x[(i, j)] = row[j];
        }
        y[i] = values[i];
    }

    let solution = solve_least_squares(&x, &y)
        .ok_or_else(|| AppError::new(4, "Least-squares solve failed (ill-conditioned design)."))?;
    let coeffs: Vec<f64> = solution.iter().copied().collect();

    let mut sse = 0.0;
    for i in 0..n {
        let r = values[i] - predict(&coeffs, times[i]);
        sse += r * r;
    }
    if !sse.is_finite() {
        return Err(AppError::new(4, "Non-finite SSE after fit."));
    }

    let rmse = (sse / n as f64).sqrt();

    let std_errors = coefficient_covariance(&x, sse)
        .map(|cov| (0..p).map(|j| cov[(j, j)].max(0.0).sqrt()).collect())
        .unwrap_or_default();

    Ok(ModelFit {
        degree,
        coeffs,
        sse,
        rmse,
        std_errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_exact_quadratic() {
        // y = 2 - 3t + 0.5t^2
        let truth = [2.0, -3.0, 0.5];
        let times: Vec<f64> = (0..6).map(|i| i as f64).collect();
        let values: Vec<f64> = times.iter().map(|&t| predict(&truth, t)).collect();

        let fit = fit_series(Degree::Quadratic, &times, &values).unwrap();
        for (a, b) in fit.coeffs.iter().zip(truth.iter()) {
            assert!((a - b).abs() < 1e-8, "coeff {a} vs {b}");
        }
        assert!(fit.rmse < 1e-8);
        assert_eq!(fit.std_errors.len(), 3);
    }

    #[test]
    fn recovers_exact_cubic() {
        let truth = [1.0, 0.5, -0.25, 0.01];
        let times: Vec<f64> = (0..10).map(|i| 1.0 + i as f64 * 2.0).collect();
        let values: Vec<f64> = times.iter().map(|&t| predict(&truth, t)).collect();

        let fit = fit_series(Degree::Cubic, &times, &values).unwrap();
        for (a, b) in fit.coeffs.iter().zip(truth.iter()) {
            assert!((a - b).abs() < 1e-6, "coeff {a} vs {b}");
        }
    }

    #[test]
    fn noisy_fit_has_positive_rmse_and_std_errors() {
        let truth = [5.0, 1.0, -0.1];
        let times: Vec<f64> = (0..20).map(|i| i as f64).collect();
        // Deterministic alternating perturbation.
        let values: Vec<f64> = times
            .iter()
            .enumerate()
            .map(|(i, &t)| predict(&truth, t) + if i % 2 == 0 { 0.5 } else { -0.5 })
            .collect();

        let fit = fit_series(Degree::Quadratic, &times, &values).unwrap();
        assert!(fit.rmse > 0.1);
        assert!(fit.std_errors.iter().all(|&s| s > 0.0));
    }

    #[test]
    fn saturated_fit_has_no_std_errors() {
        let times = [0.0, 1.0, 2.0];
        let values = [1.0, 2.0, 5.0];
        let fit = fit_series(Degree::Quadratic, &times, &values).unwrap();
        assert!(fit.rmse < 1e-8);
        assert!(fit.std_errors.is_empty());
    }

    #[test]
    fn underdetermined_series_is_rejected() {
        let err = fit_series(Degree::Quadratic, &[1.0, 2.0], &[1.0, 2.0]).unwrap_err();
        assert_eq!(err.exit_code(), 3);

        let err = fit_series(Degree::Quadratic, &[], &[]).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
