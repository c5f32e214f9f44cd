//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - reloaded later for plotting or comparisons

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Which CSV column supplies the fitted y-value.
///
/// The lookup table stores four corner option prices per cell (`aa`, `ab`,
/// `ba`, `bb`) plus the cell-origin spot/strike ratio. The original
/// exploratory scripts fit the `aa` corner; the other columns exist so the
/// same tool covers all variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ValueColumn {
    Aa,
    Ab,
    Ba,
    Bb,
    Ratio,
}

impl ValueColumn {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ValueColumn::Aa => "price AA",
            ValueColumn::Ab => "price AB",
            ValueColumn::Ba => "price BA",
            ValueColumn::Bb => "price BB",
            ValueColumn::Ratio => "spot/strike ratio",
        }
    }
}

/// Which integer column partitions rows into groups before fitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GroupKey {
    /// Ratio-axis index.
    I,
    /// Time-axis index.
    J,
    /// Flattened chunk index (last, optional CSV column).
    K,
}

impl GroupKey {
    pub fn display_name(self) -> &'static str {
        match self {
            GroupKey::I => "i",
            GroupKey::J => "j",
            GroupKey::K => "k",
        }
    }
}

/// Polynomial degree fitted per group.
///
/// The original script variants fit either a quadratic or a cubic; the degree
/// is a flag here instead of a separate script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Degree {
    #[value(name = "2")]
    Quadratic,
    #[value(name = "3")]
    Cubic,
}

impl Degree {
    /// Polynomial order (highest exponent).
    pub fn order(self) -> usize {
        match self {
            Degree::Quadratic => 2,
            Degree::Cubic => 3,
        }
    }

    /// Number of coefficients (order + intercept).
    pub fn coeff_len(self) -> usize {
        self.order() + 1
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Degree::Quadratic => "quadratic",
            Degree::Cubic => "cubic",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Degree::Quadratic => Degree::Cubic,
            Degree::Cubic => Degree::Quadratic,
        }
    }
}

/// A raw row of the lookup-table CSV.
///
/// Fixed column layout (no headers):
/// `aa, ab, ba, bb, ss_ratio, time, i, j[, k]`.
///
/// `k` is absent in older 8-column exports, so it is optional here; rows
/// without it are only unusable when the run groups by `k`.
#[derive(Debug, Clone)]
pub struct SampleRow {
    pub aa: f64,
    pub ab: f64,
    pub ba: f64,
    pub bb: f64,
    pub ss_ratio: f64,
    /// Expiration time at the cell origin (days).
    pub time: f64,
    pub i: i64,
    pub j: i64,
    pub k: Option<i64>,
}

impl SampleRow {
    /// Value of the selected y-column.
    pub fn value(&self, column: ValueColumn) -> f64 {
        match column {
            ValueColumn::Aa => self.aa,
            ValueColumn::Ab => self.ab,
            ValueColumn::Ba => self.ba,
            ValueColumn::Bb => self.bb,
            ValueColumn::Ratio => self.ss_ratio,
        }
    }

    /// Value of the selected grouping key, if present on this row.
    pub fn key(&self, key: GroupKey) -> Option<i64> {
        match key {
            GroupKey::I => Some(self.i),
            GroupKey::J => Some(self.j),
            GroupKey::K => self.k,
        }
    }
}

/// One group's `(time, value)` series, sorted by time ascending.
///
/// Times and values are parallel arrays so the fitter can consume them
/// without further copying.
#[derive(Debug, Clone)]
pub struct GroupSeries {
    pub key: i64,
    pub times: Vec<f64>,
    pub values: Vec<f64>,
}

impl GroupSeries {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// Fitted polynomial parameters.
///
/// Coefficients are stored ascending (intercept first) and evaluated with
/// Horner's rule; see `models::predict`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolyModel {
    pub degree: Degree,
    pub coeffs: Vec<f64>,
}

/// Fit quality diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitQuality {
    pub sse: f64,
    pub rmse: f64,
    pub n: usize,
}

/// Fit output for a single group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupFit {
    pub key: i64,
    pub model: PolyModel,
    pub quality: FitQuality,
    /// Per-coefficient standard errors from `sigma^2 (X^T X)^-1`.
    ///
    /// Empty when the fit is saturated (n == coefficient count) or the
    /// normal matrix is not invertible.
    pub std_errors: Vec<f64>,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub csv_path: PathBuf,
    pub value: ValueColumn,
    pub group: GroupKey,
    pub degree: Degree,

    /// Restrict the run to a single group key.
    pub key_filter: Option<i64>,

    pub top_n: usize,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_results: Option<PathBuf>,
    pub export_curve: Option<PathBuf>,
    pub debug_bundle: bool,
}

/// A saved curve file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveFile {
    pub tool: String,
    pub value: ValueColumn,
    pub group: GroupKey,
    pub degree: Degree,
    pub curves: Vec<CurveEntry>,
}

/// One fitted group inside a curve file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveEntry {
    pub key: i64,
    pub model: PolyModel,
    pub quality: FitQuality,
    pub grid: CurveGrid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveGrid {
    pub time: Vec<f64>,
    pub value: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degree_coefficient_counts() {
        assert_eq!(Degree::Quadratic.coeff_len(), 3);
        assert_eq!(Degree::Cubic.coeff_len(), 4);
        assert_eq!(Degree::Quadratic.toggled(), Degree::Cubic);
    }

    #[test]
    fn row_key_missing_k() {
        let row = SampleRow {
            aa: 1.0,
            ab: 2.0,
            ba: 3.0,
            bb: 4.0,
            ss_ratio: 1.0,
            time: 10.0,
            i: 3,
            j: 7,
            k: None,
        };
        assert_eq!(row.key(GroupKey::I), Some(3));
        assert_eq!(row.key(GroupKey::J), Some(7));
        assert_eq!(row.key(GroupKey::K), None);
        assert_eq!(row.value(ValueColumn::Bb), 4.0);
    }
}
