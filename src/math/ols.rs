//! Least squares solver and coefficient covariance.
//!
//! Every group fit solves a small linear regression of the form:
//!
//! ```text
//! minimize Σ (y_i - x_i^T c)^2
//! ```
//!
//! where `x_i` is a Vandermonde row `[1, t, t^2, ...]`.
//!
//! Implementation choices:
//! - We use SVD to solve the least-squares problem robustly even when
//!   the design matrix is tall (more rows than columns).
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - Raw powers of `time` (tens to hundreds of days) produce badly scaled
//!   Vandermonde columns; the SVD solve with tiered tolerances absorbs that
//!   without requiring the caller to rescale.
//! - Parameter dimension is tiny (3-4 columns), so SVD performance is a
//!   non-issue even with thousands of groups.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(coeffs) = svd.solve(y, tol) {
            if coeffs.iter().all(|v| v.is_finite()) {
                return Some(coeffs);
            }
        }
    }

    None
}

/// Coefficient covariance `sigma^2 (X^T X)^-1` with `sigma^2 = sse / (n - p)`.
///
/// Returns `None` when the fit is saturated (`n <= p`) or the normal matrix
/// is singular.
pub fn coefficient_covariance(x: &DMatrix<f64>, sse: f64) -> Option<DMatrix<f64>> {
    let n = x.nrows();
    let p = x.ncols();
    if n <= p || !sse.is_finite() || sse < 0.0 {
        return None;
    }

    let sigma2 = sse / (n - p) as f64;
    let xtx = x.transpose() * x;
    let inv = xtx.try_inverse()?;
    let cov = inv * sigma2;

    if cov.iter().all(|v| v.is_finite()) {
        Some(cov)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let coeffs = solve_least_squares(&x, &y).unwrap();
        assert!((coeffs[0] - 2.0).abs() < 1e-10);
        assert!((coeffs[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn covariance_shrinks_with_more_points() {
        // Same model, more observations -> smaller diagonal entries.
        let build = |n: usize| {
            let mut rows = Vec::with_capacity(n * 2);
            for i in 0..n {
                rows.push(1.0);
                rows.push(i as f64);
            }
            DMatrix::from_row_slice(n, 2, &rows)
        };

        let cov_small = coefficient_covariance(&build(5), 1.0).unwrap();
        let cov_large = coefficient_covariance(&build(50), 1.0).unwrap();
        assert!(cov_large[(0, 0)] < cov_small[(0, 0)]);
        assert!(cov_large[(1, 1)] < cov_small[(1, 1)]);
    }

    #[test]
    fn covariance_rejects_saturated_fit() {
        let x = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 1.0, 1.0]);
        assert!(coefficient_covariance(&x, 0.0).is_none());
    }
}
