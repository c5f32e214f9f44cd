//! Lookup-table CSV generation.
//!
//! Reproduces the upstream table generator: fixed spot 100, volatility 100%,
//! rate 0, with strike and expiration swept over a (ratio x time) grid. Each
//! output row is one grid cell carrying the four corner call prices, the
//! cell-origin ratio and time, and the grid indexes.
//!
//! Optional seeded Gaussian noise perturbs the prices so the fitter can be
//! exercised on non-exact data.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::SampleRow;
use crate::error::AppError;
use crate::math::call_price;

/// Fixed spot price of the table.
pub const SPOT_FIXED: f64 = 100.0;
/// Fixed annualized volatility of the table (100%).
pub const VOL_FIXED: f64 = 1.0;

/// Generator configuration (from `lut gen` flags).
#[derive(Debug, Clone)]
pub struct GenConfig {
    pub out: PathBuf,
    pub ratio_min: f64,
    pub ratio_max: f64,
    pub ratio_step: f64,
    /// Expiration sweep in days.
    pub time_min: f64,
    pub time_max: f64,
    pub time_step: f64,
    /// Additive price noise sigma; `None` writes exact prices.
    pub noise: Option<f64>,
    pub seed: u64,
}

/// What a generation run produced.
#[derive(Debug, Clone)]
pub struct GenSummary {
    pub rows_written: usize,
    pub ratio_cells: usize,
    pub time_cells: usize,
}

/// Generate the table and write it as a headerless CSV.
pub fn generate_lookup_csv(config: &GenConfig) -> Result<GenSummary, AppError> {
    let rows = build_rows(config)?;

    let mut file = File::create(&config.out).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create CSV '{}': {e}", config.out.display()),
        )
    })?;

    for row in &rows {
        writeln!(
            file,
            "{:.10},{:.10},{:.10},{:.10},{},{},{},{},{}",
            row.aa,
            row.ab,
            row.ba,
            row.bb,
            row.ss_ratio,
            row.time,
            row.i,
            row.j,
            // build_rows always sets `k`
            row.k.unwrap_or_default(),
        )
        .map_err(|e| AppError::new(2, format!("Failed to write CSV row: {e}")))?;
    }

    let time_cells = grid_points(config.time_min, config.time_max, config.time_step)?.len() - 1;
    let ratio_cells = grid_points(config.ratio_min, config.ratio_max, config.ratio_step)?.len() - 1;

    Ok(GenSummary {
        rows_written: rows.len(),
        ratio_cells,
        time_cells,
    })
}

/// Build all cell rows in memory (deterministic for a given config).
pub fn build_rows(config: &GenConfig) -> Result<Vec<SampleRow>, AppError> {
    let ratios = grid_points(config.ratio_min, config.ratio_max, config.ratio_step)?;
    let times = grid_points(config.time_min, config.time_max, config.time_step)?;

    if ratios.len() < 2 || times.len() < 2 {
        return Err(AppError::new(
            2,
            "Grid too small: need at least two points on each axis.",
        ));
    }
    if let Some(sigma) = config.noise {
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(AppError::new(2, "Noise sigma must be finite and > 0."));
        }
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = match config.noise {
        Some(sigma) => Some(
            Normal::new(0.0, sigma)
                .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?,
        ),
        None => None,
    };

    let time_cells = times.len() - 1;
    let mut rows = Vec::with_capacity((ratios.len() - 1) * time_cells);

    for i in 0..ratios.len() - 1 {
        // Strike is derived from the spot/strike ratio at each cell corner.
        let strike_a = SPOT_FIXED / ratios[i];
        let strike_b = SPOT_FIXED / ratios[i + 1];

        for j in 0..time_cells {
            let years_a = times[j] / 365.0;
            let years_b = times[j + 1] / 365.0;

            let mut aa = call_price(SPOT_FIXED, strike_a, years_a, VOL_FIXED, 0.0);
            let mut ab = call_price(SPOT_FIXED, strike_a, years_b, VOL_FIXED, 0.0);
            let mut ba = call_price(SPOT_FIXED, strike_b, years_a, VOL_FIXED, 0.0);
            let mut bb = call_price(SPOT_FIXED, strike_b, years_b, VOL_FIXED, 0.0);

            if let Some(normal) = &normal {
                aa = (aa + normal.sample(&mut rng)).max(0.0);
                ab = (ab + normal.sample(&mut rng)).max(0.0);
                ba = (ba + normal.sample(&mut rng)).max(0.0);
                bb = (bb + normal.sample(&mut rng)).max(0.0);
            }

            rows.push(SampleRow {
                aa,
                ab,
                ba,
                bb,
                ss_ratio: ratios[i],
                time: times[j],
                i: i as i64,
                j: j as i64,
                k: Some((i * time_cells + j) as i64),
            });
        }
    }

    Ok(rows)
}

/// Inclusive grid `start, start+step, ..., end` with a rounded step count.
fn grid_points(start: f64, end: f64, step: f64) -> Result<Vec<f64>, AppError> {
    if !(start.is_finite() && end.is_finite() && step.is_finite() && step > 0.0 && end > start) {
        return Err(AppError::new(
            2,
            format!("Invalid grid: start={start}, end={end}, step={step}."),
        ));
    }

    let step_count = ((end - start) / step).round() as usize;
    let mut points = Vec::with_capacity(step_count + 1);
    for i in 0..=step_count {
        points.push(start + step * i as f64);
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> GenConfig {
        GenConfig {
            out: PathBuf::from("unused.csv"),
            ratio_min: 0.8,
            ratio_max: 1.2,
            ratio_step: 0.1,
            time_min: 20.0,
            time_max: 100.0,
            time_step: 20.0,
            noise: None,
            seed: 42,
        }
    }

    #[test]
    fn grid_points_inclusive_endpoints() {
        let points = grid_points(0.5, 2.0, 0.05).unwrap();
        assert_eq!(points.len(), 31);
        assert!((points[0] - 0.5).abs() < 1e-12);
        assert!((points[30] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn build_rows_covers_every_cell() {
        // 4 ratio cells x 4 time cells.
        let rows = build_rows(&small_config()).unwrap();
        assert_eq!(rows.len(), 16);

        // k flattens (i, j) row-major over time cells.
        for row in &rows {
            assert_eq!(row.k, Some(row.i * 4 + row.j));
            assert!(row.aa.is_finite() && row.aa >= 0.0);
            // Longer expiry at the same strike is worth more.
            assert!(row.ab > row.aa);
        }
    }

    #[test]
    fn deeper_in_the_money_is_worth_more() {
        // Higher spot/strike ratio means lower strike, so the B corner
        // (next ratio point) dominates the A corner.
        let rows = build_rows(&small_config()).unwrap();
        for row in &rows {
            assert!(row.ba > row.aa);
            assert!(row.bb > row.ab);
        }
    }

    #[test]
    fn noise_is_seed_deterministic() {
        let mut config = small_config();
        config.noise = Some(0.05);

        let a = build_rows(&config).unwrap();
        let b = build_rows(&config).unwrap();
        for (ra, rb) in a.iter().zip(b.iter()) {
            assert_eq!(ra.aa, rb.aa);
            assert_eq!(ra.bb, rb.bb);
        }

        config.seed = 43;
        let c = build_rows(&config).unwrap();
        assert!(a.iter().zip(c.iter()).any(|(ra, rc)| ra.aa != rc.aa));
    }

    #[test]
    fn noise_never_goes_negative() {
        let mut config = small_config();
        config.noise = Some(50.0);
        let rows = build_rows(&config).unwrap();
        assert!(rows.iter().all(|r| r.aa >= 0.0 && r.bb >= 0.0));
    }
}
