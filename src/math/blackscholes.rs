//! Black-Scholes call pricing for the lookup-table generator.
//!
//! The generator fixes spot = 100, volatility = 100%, rate = 0 and sweeps
//! strike and expiration, so only the plain European call price is needed.
//!
//! Numerical notes:
//! - The normal CDF is computed from an Abramowitz-Stegun (7.1.26) rational
//!   approximation of `erf`, accurate to ~1.5e-7 absolute. That is far below
//!   the interpolation error the lookup table itself carries.
//! - Degenerate inputs (`t <= 0` or `vol <= 0`) collapse to discounted
//!   intrinsic value instead of producing NaNs from `ln(s/k) / 0`.

use std::f64::consts::SQRT_2;

/// Standard normal CDF.
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / SQRT_2))
}

/// Error function via Abramowitz-Stegun 7.1.26 (odd extension for x < 0).
fn erf(x: f64) -> f64 {
    const P: f64 = 0.327_591_1;
    const A1: f64 = 0.254_829_592;
    const A2: f64 = -0.284_496_736;
    const A3: f64 = 1.421_413_741;
    const A4: f64 = -1.453_152_027;
    const A5: f64 = 1.061_405_429;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

/// European call price.
///
/// `years` is time to expiry in years, `vol` an annualized volatility
/// (1.0 = 100%), `rate` a continuously compounded rate.
pub fn call_price(spot: f64, strike: f64, years: f64, vol: f64, rate: f64) -> f64 {
    if years <= 0.0 || vol <= 0.0 {
        let forward_intrinsic = spot - strike * (-rate * years).exp();
        return forward_intrinsic.max(0.0);
    }

    let sigma_sqrt_t = vol * years.sqrt();
    let d1 = ((spot / strike).ln() + (rate + 0.5 * vol * vol) * years) / sigma_sqrt_t;
    let d2 = d1 - sigma_sqrt_t;

    spot * norm_cdf(d1) - strike * (-rate * years).exp() * norm_cdf(d2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn norm_cdf_symmetry() {
        assert!((norm_cdf(0.0) - 0.5).abs() < 1e-9);
        for &x in &[0.1, 0.5, 1.0, 2.0, 3.5] {
            let hi = norm_cdf(x);
            let lo = norm_cdf(-x);
            assert!((hi + lo - 1.0).abs() < 1e-6, "cdf symmetry broke at {x}");
            assert!(hi > 0.5 && lo < 0.5);
        }
    }

    #[test]
    fn atm_call_matches_small_time_approximation() {
        // For an at-the-money call with r=0, price ~= 0.3989 * S * vol * sqrt(T).
        let years = 20.0 / 365.0;
        let price = call_price(100.0, 100.0, years, 1.0, 0.0);
        let approx = 0.398_942 * 100.0 * years.sqrt();
        assert!(
            (price - approx).abs() / approx < 0.05,
            "price {price} vs approx {approx}"
        );
    }

    #[test]
    fn call_price_bounds_and_monotonicity() {
        // 0 <= C <= S, and C grows with expiry.
        let mut prev = 0.0;
        for days in [10.0, 50.0, 200.0, 1000.0] {
            let c = call_price(100.0, 125.0, days / 365.0, 1.0, 0.0);
            assert!(c >= 0.0 && c <= 100.0);
            assert!(c > prev, "call price should grow with expiry");
            prev = c;
        }
    }

    #[test]
    fn degenerate_expiry_is_intrinsic() {
        assert_eq!(call_price(100.0, 80.0, 0.0, 1.0, 0.0), 20.0);
        assert_eq!(call_price(100.0, 120.0, 0.0, 1.0, 0.0), 0.0);
    }
}
