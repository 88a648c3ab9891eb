//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - maps them into domain configs
//! - runs the pipeline
//! - prints reports/plots
//! - writes optional exports

use std::path::Path;

use clap::Parser;

use crate::cli::{Cli, Command, FitArgs, MatrixArgs, PlotArgs};
use crate::domain::{Envelope, MatrixConfig, ProfileSpec, RunConfig, SamplingSpec};
use crate::error::GhError;
use crate::math::LmConfig;

pub mod pipeline;

/// Entry point for the `gh` binary.
pub fn run() -> Result<(), GhError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Fit(args) => handle_fit(&args),
        Command::Matrix(args) => handle_matrix(&args),
        Command::Plot(args) => handle_plot(&args),
    }
}

fn handle_fit(args: &FitArgs) -> Result<(), GhError> {
    let config = run_config_from_args(args);
    let run = pipeline::run_fit(&config)?;

    println!(
        "{}",
        crate::report::format_run_header(&run.label, run.range, run.integral)
    );
    if let Some(ingest) = &run.ingest {
        println!(
            "Rows: read={} used={} skipped={}",
            ingest.rows_read, ingest.rows_used, ingest.rows_skipped
        );
    }
    println!(
        "{}",
        crate::report::format_expansions(&run.expansions, &run.quality)
    );

    if config.plot {
        let plot = crate::plot::render_ascii_plot(
            &run.profile,
            &run.expansions,
            run.range,
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    if let Some(path) = &config.export {
        crate::io::write_expansions_json(path, &run.export_document())?;
    }
    Ok(())
}

fn handle_matrix(args: &MatrixArgs) -> Result<(), GhError> {
    let config = matrix_config_from_args(args)?;
    let (matrix, doc) = pipeline::run_matrix(&config)?;

    println!(
        "{}",
        crate::report::format_matrix(config.degree, &config.grid, &matrix)
    );
    if let Some(path) = &config.export {
        crate::io::write_matrix_json(path, &doc)?;
    }
    Ok(())
}

fn handle_plot(args: &PlotArgs) -> Result<(), GhError> {
    let plot = render_saved_expansions(&args.from, args.plot_width, args.plot_height)?;
    println!("{plot}");
    Ok(())
}

/// Load an expansion JSON and render its stored grid.
pub fn render_saved_expansions(path: &Path, width: usize, height: usize) -> Result<String, GhError> {
    let doc = crate::io::read_expansions_json(path)?;
    Ok(format!(
        "Profile: {} ({} expansions)\n{}",
        doc.profile,
        doc.expansions.len(),
        crate::plot::render_ascii_plot_from_expansion_file(&doc, width, height)
    ))
}

pub fn run_config_from_args(args: &FitArgs) -> RunConfig {
    let profile = ProfileSpec {
        kind: args.profile,
        amplitude: args.amplitude,
        center: args.center,
        width: args.width,
        h3: args.h3,
        h4: args.h4,
        mix_fraction: args.mix_fraction,
        mix_offset: args.mix_offset,
        mix_width: args.mix_width,
    };
    let sampling = args.samples.map(|samples| SamplingSpec {
        samples,
        noise: args.noise,
        seed: args.seed,
    });
    // An envelope is only fixed when all three parameters are given.
    let envelope = match (args.env_amplitude, args.env_center, args.env_width) {
        (Some(a), Some(c), Some(w)) => Some(Envelope::new(a, c, w)),
        _ => None,
    };

    RunConfig {
        profile,
        sampling,
        input_csv: args.input.clone(),
        orders: args.orders.clone(),
        envelope,
        strategy: args.strategy,
        lm: LmConfig {
            tolerance: args.tolerance,
            max_evaluations: args.max_evaluations,
        },
        plot: args.plot && !args.no_plot,
        plot_width: args.plot_width,
        plot_height: args.plot_height,
        export: args.export.clone(),
    }
}

pub fn matrix_config_from_args(args: &MatrixArgs) -> Result<MatrixConfig, GhError> {
    let grid = match &args.grid {
        Some(grid) => grid.clone(),
        None => uniform_grid(args.grid_min, args.grid_max, args.grid_size)?,
    };
    Ok(MatrixConfig {
        degree: args.degree,
        grid,
        order: args.order,
        envelope: Envelope::new(args.env_amplitude, args.env_center, args.env_width),
        export: args.export.clone(),
    })
}

fn uniform_grid(lo: f64, hi: f64, n: usize) -> Result<Vec<f64>, GhError> {
    if n < 2 || !(lo.is_finite() && hi.is_finite() && hi > lo) {
        return Err(GhError::InvalidGrid(format!(
            "cannot build {n} uniform breakpoints on [{lo}, {hi}]"
        )));
    }
    Ok((0..n)
        .map(|i| lo + (hi - lo) * i as f64 / (n - 1) as f64)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FitStrategy;

    fn fit_args(extra: &[&str]) -> FitArgs {
        let argv = ["gh", "fit"].iter().chain(extra.iter()).copied();
        match Cli::parse_from(argv).command {
            Command::Fit(args) => args,
            _ => panic!("expected fit"),
        }
    }

    #[test]
    fn partial_envelope_means_fit() {
        let config = run_config_from_args(&fit_args(&["--env-amplitude", "1", "--env-width", "2"]));
        assert!(config.envelope.is_none());

        let config = run_config_from_args(&fit_args(&[
            "--env-amplitude",
            "1",
            "--env-center",
            "0",
            "--env-width",
            "2",
        ]));
        assert_eq!(config.envelope, Some(Envelope::new(1.0, 0.0, 2.0)));
    }

    #[test]
    fn flags_map_into_run_config() {
        let config = run_config_from_args(&fit_args(&[
            "--samples",
            "300",
            "--noise",
            "0.02",
            "--strategy",
            "joint",
            "--tolerance",
            "1e-8",
            "--no-plot",
        ]));
        assert_eq!(
            config.sampling,
            Some(SamplingSpec {
                samples: 300,
                noise: 0.02,
                seed: 42
            })
        );
        assert_eq!(config.strategy, FitStrategy::EnvelopeAndShape);
        assert_eq!(config.lm.tolerance, 1e-8);
        assert_eq!(config.lm.max_evaluations, 100);
        assert!(!config.plot);
    }

    #[test]
    fn matrix_grid_defaults_to_uniform() {
        let args = match Cli::parse_from(["gh", "matrix", "--grid-size", "5"]).command {
            Command::Matrix(args) => args,
            _ => panic!("expected matrix"),
        };
        let config = matrix_config_from_args(&args).unwrap();
        assert_eq!(config.grid, vec![-5.0, -2.5, 0.0, 2.5, 5.0]);
        assert_eq!(config.degree, 3);
    }

    #[test]
    fn exported_run_can_be_plotted_again() {
        let f = |x: f64| (-0.5 * x * x).exp();
        let gh = crate::models::GaussHermiteExpansion::fit(&f, 4).unwrap();
        let doc = crate::io::expansion_file("gaussian", &f, (-5.0, 5.0), &[gh]);
        let path = std::env::temp_dir().join(format!("gh-replot-{}.json", std::process::id()));
        crate::io::write_expansions_json(&path, &doc).unwrap();
        let txt = render_saved_expansions(&path, 30, 8);
        let _ = std::fs::remove_file(&path);

        let txt = txt.unwrap();
        assert!(txt.starts_with("Profile: gaussian (1 expansions)"), "{txt}");
        assert!(txt.contains("- order 4"), "{txt}");
    }

    #[test]
    fn missing_plot_source_is_an_io_error() {
        let err = render_saved_expansions(Path::new("/nonexistent/gh.json"), 30, 8).unwrap_err();
        assert!(matches!(err, GhError::Io(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn uniform_grid_rejects_empty_ranges() {
        assert!(matches!(
            uniform_grid(1.0, 1.0, 5),
            Err(GhError::InvalidGrid(_))
        ));
        assert!(uniform_grid(0.0, 1.0, 1).is_err());
    }
}
