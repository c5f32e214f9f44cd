//! Polynomial evaluation for the per-group fits.
//!
//! The fitter relies on two primitive operations:
//! - build a design row for a given time (for OLS)
//! - predict y(t) given coefficients (for residuals/plots)
//!
//! Coefficients are ordered ascending: `y(t) = c0 + c1 t + ... + c_d t^d`.

use crate::domain::Degree;

/// Fill a Vandermonde design row `[1, t, t^2, ...]` for the given degree.
///
/// # Panics
/// Panics if `out` does not have length `degree.coeff_len()`. Callers should
/// size the array correctly.
pub fn fill_design_row(degree: Degree, t: f64, out: &mut [f64]) {
    debug_assert_eq!(out.len(), degree.coeff_len());
    let mut pow = 1.0;
    for slot in out.iter_mut() {
        *slot = pow;
        pow *= t;
    }
}

/// Predict `y(t)` via Horner's rule.
pub fn predict(coeffs: &[f64], t: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, &c| acc * t + c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn design_row_is_powers_of_t() {
        let mut row = [0.0; 3];
        fill_design_row(Degree::Quadratic, 2.0, &mut row);
        assert_eq!(row, [1.0, 2.0, 4.0]);

        let mut row = [0.0; 4];
        fill_design_row(Degree::Cubic, 3.0, &mut row);
        assert_eq!(row, [1.0, 3.0, 9.0, 27.0]);
    }

    #[test]
    fn horner_matches_naive_evaluation() {
        let coeffs = [2.0, -3.0, 0.5, 0.25];
        for &t in &[0.0f64, 0.5, 1.0, 4.0, 17.5] {
            let naive: f64 = coeffs
                .iter()
                .enumerate()
                .map(|(p, &c)| c * t.powi(p as i32))
                .sum();
            assert!((predict(&coeffs, t) - naive).abs() < 1e-9);
        }
    }
}
