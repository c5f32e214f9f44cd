//! Command-line parsing for the lookup-table curve fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{Degree, GroupKey, ValueColumn};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "lut", version, about = "Per-group polynomial curve fitter for the Black-Scholes lookup table")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit per-group polynomials, print diagnostics, and optionally plot/export.
    Fit(FitArgs),
    /// Plot a previously exported curve JSON.
    Plot(PlotArgs),
    /// Generate the lookup-table CSV (Black-Scholes sweep).
    Gen(GenArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying fit pipeline as `lut fit`, but renders
    /// results in a terminal UI using Ratatui.
    Tui(FitArgs),
}

/// Common options for fitting.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Path to the generated lookup-table CSV.
    #[arg(long, default_value = "generated.csv")]
    pub csv: PathBuf,

    /// Which column to fit against time.
    #[arg(short = 'v', long, value_enum, default_value_t = ValueColumn::Aa)]
    pub value: ValueColumn,

    /// Which integer column partitions rows into groups.
    #[arg(short = 'g', long, value_enum, default_value_t = GroupKey::K)]
    pub group: GroupKey,

    /// Polynomial degree fitted per group.
    #[arg(short = 'd', long, value_enum, default_value_t = Degree::Quadratic)]
    pub degree: Degree,

    /// Restrict the run to a single group key.
    #[arg(short = 'k', long)]
    pub key: Option<i64>,

    /// Show the top-N worst-fitted groups.
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export per-point results to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export fitted curves (models + sampled grids) to JSON.
    #[arg(long = "export-curve")]
    pub export_curve: Option<PathBuf>,

    /// Write a markdown debug bundle of the run.
    #[arg(long)]
    pub debug_bundle: bool,
}

/// Options for plotting a saved curve.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Curve JSON file produced by `lut fit --export-curve`.
    #[arg(long, value_name = "JSON")]
    pub curve: PathBuf,

    /// Group key to plot (defaults to the first entry).
    #[arg(short = 'k', long)]
    pub key: Option<i64>,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Options for generating the lookup-table CSV.
#[derive(Debug, Parser)]
pub struct GenArgs {
    /// Output CSV path.
    #[arg(long, default_value = "generated.csv")]
    pub out: PathBuf,

    /// Minimum spot/strike ratio.
    #[arg(long, default_value_t = 0.5)]
    pub ratio_min: f64,

    /// Maximum spot/strike ratio.
    #[arg(long, default_value_t = 2.0)]
    pub ratio_max: f64,

    /// Spot/strike ratio grid step.
    #[arg(long, default_value_t = 0.05)]
    pub ratio_step: f64,

    /// Minimum expiration (days).
    #[arg(long, default_value_t = 10.0)]
    pub time_min: f64,

    /// Maximum expiration (days).
    #[arg(long, default_value_t = 1000.0)]
    pub time_max: f64,

    /// Expiration grid step (days).
    #[arg(long, default_value_t = 1.25)]
    pub time_step: f64,

    /// Additive Gaussian price noise sigma (omit for exact prices).
    #[arg(long)]
    pub noise: Option<f64>,

    /// Random seed for noise generation.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}
