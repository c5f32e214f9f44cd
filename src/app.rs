//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads (or generates) the lookup-table CSV
//! - runs per-group curve fitting
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;

use crate::cli::{Command, FitArgs, GenArgs, PlotArgs};
use crate::data::GenConfig;
use crate::domain::FitConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `lut` binary.
pub fn run() -> Result<(), AppError> {
    // We want bare `lut` and `lut -d 3` to behave like `lut tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing. This preserves a clean clap structure while
    // retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Plot(args) => handle_plot(args),
        Command::Gen(args) => handle_gen(args),
        Command::Tui(args) => crate::tui::run(fit_config_from_args(&args)),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args);
    let run = pipeline::run_fit(&config)?;

    println!(
        "{}",
        crate::report::format_run_summary(&run.ingest, &run.group_set, &run.fit_set, &config)
    );
    println!("{}", crate::report::format_fit_table(&run.fit_set.fits));

    // With many groups the worst-fit ranking is the useful lens; with a single
    // requested key it would just repeat the table.
    if config.key_filter.is_none() && run.fit_set.fits.len() > 1 {
        println!(
            "{}",
            crate::report::format_rankings(&run.fit_set.fits, config.top_n)
        );
    }

    if config.plot {
        let shown = match config.key_filter {
            Some(key) => run.fit_set.fit_for_key(key),
            None => run.fit_set.fits.first(),
        };
        if let Some(fit) = shown {
            if let Some(series) = run.group_set.groups.iter().find(|g| g.key == fit.key) {
                let plot = crate::plot::render_ascii_plot(
                    series,
                    fit,
                    config.plot_width,
                    config.plot_height,
                );
                println!("{plot}");
            }
        }
    }

    // Optional exports.
    if let Some(path) = &config.export_results {
        crate::io::export::write_results_csv(path, &run.residuals, &config)?;
    }
    if let Some(path) = &config.export_curve {
        crate::io::curve::write_curve_json(path, &run.fit_set, &run.group_set.groups, &config)?;
    }
    if config.debug_bundle {
        let path = crate::debug::write_debug_bundle(&run, &config)?;
        println!("Debug bundle: {}", path.display());
    }

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let curve = crate::io::curve::read_curve_json(&args.curve)?;

    let entry = match args.key {
        Some(key) => curve.curves.iter().find(|c| c.key == key).ok_or_else(|| {
            AppError::new(
                2,
                format!("No group with key={key} in '{}'.", args.curve.display()),
            )
        })?,
        None => curve.curves.first().ok_or_else(|| {
            AppError::new(2, format!("Empty curve file '{}'.", args.curve.display()))
        })?,
    };

    let plot = crate::plot::render_ascii_plot_from_curve_entry(entry, args.width, args.height);
    println!(
        "Curve file: {} groups | value={} | group by {} | degree {}",
        curve.curves.len(),
        curve.value.display_name(),
        curve.group.display_name(),
        curve.degree.order(),
    );
    println!("{plot}");
    Ok(())
}

fn handle_gen(args: GenArgs) -> Result<(), AppError> {
    let config = GenConfig {
        out: args.out.clone(),
        ratio_min: args.ratio_min,
        ratio_max: args.ratio_max,
        ratio_step: args.ratio_step,
        time_min: args.time_min,
        time_max: args.time_max,
        time_step: args.time_step,
        noise: args.noise,
        seed: args.seed,
    };

    let summary = crate::data::generate_lookup_csv(&config)?;
    println!(
        "Wrote {} rows ({} ratio cells x {} time cells) to '{}'.",
        summary.rows_written,
        summary.ratio_cells,
        summary.time_cells,
        args.out.display()
    );
    Ok(())
}

pub fn fit_config_from_args(args: &FitArgs) -> FitConfig {
    FitConfig {
        csv_path: args.csv.clone(),
        value: args.value,
        group: args.group,
        degree: args.degree,
        key_filter: args.key,
        top_n: args.top,
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_results: args.export.clone(),
        export_curve: args.export_curve.clone(),
        debug_bundle: args.debug_bundle,
    }
}

/// Rewrite argv so `lut` defaults to `lut tui`.
///
/// Rules:
/// - `lut`                     -> `lut tui`
/// - `lut -d 3 ...`            -> `lut tui -d 3 ...`
/// - `lut --help/--version/-h` -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version =
        matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "fit" | "plot" | "gen" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_tui() {
        assert_eq!(rewrite_args(argv(&["lut"])), argv(&["lut", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["lut", "-d", "3"])),
            argv(&["lut", "tui", "-d", "3"])
        );
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        assert_eq!(
            rewrite_args(argv(&["lut", "fit", "--csv", "x.csv"])),
            argv(&["lut", "fit", "--csv", "x.csv"])
        );
        assert_eq!(rewrite_args(argv(&["lut", "--help"])), argv(&["lut", "--help"]));
        assert_eq!(rewrite_args(argv(&["lut", "gen"])), argv(&["lut", "gen"]));
    }
}
