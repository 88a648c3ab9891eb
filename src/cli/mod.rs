//! Command-line parsing for the `gh` binary.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! numerical code; `app` maps the parsed arguments into domain configs.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{FitStrategy, ProfileKind};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "gh", version, about = "Gauss-Hermite expansion of line profiles")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Expand a profile (synthetic or tabulated) for one or more orders.
    Fit(FitArgs),
    /// Build the B-spline-to-GH coefficient matrix for a grid.
    Matrix(MatrixArgs),
    /// Plot a previously exported expansion JSON.
    Plot(PlotArgs),
}

/// Options of `gh fit`.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Synthetic profile family.
    #[arg(short = 'p', long, value_enum, default_value_t = ProfileKind::GaussHermite)]
    pub profile: ProfileKind,

    /// Read a tabulated profile (`x,f` CSV) instead of a synthetic one.
    #[arg(long, value_name = "CSV", conflicts_with = "profile")]
    pub input: Option<PathBuf>,

    /// Profile integral.
    #[arg(long, default_value_t = 1.0)]
    pub amplitude: f64,

    /// Profile center.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub center: f64,

    /// Profile dispersion.
    #[arg(long, default_value_t = 1.0)]
    pub width: f64,

    /// Third GH term of the `gauss-hermite` profile.
    #[arg(long, default_value_t = 0.05, allow_negative_numbers = true)]
    pub h3: f64,

    /// Fourth GH term of the `gauss-hermite` profile.
    #[arg(long, default_value_t = 0.03, allow_negative_numbers = true)]
    pub h4: f64,

    /// Fraction of the integral in the second component (`double-gaussian`).
    #[arg(long, default_value_t = 0.3)]
    pub mix_fraction: f64,

    /// Offset of the second component from `center` (`double-gaussian`).
    #[arg(long, default_value_t = 1.5, allow_negative_numbers = true)]
    pub mix_offset: f64,

    /// Dispersion of the second component (`double-gaussian`).
    #[arg(long, default_value_t = 0.6)]
    pub mix_width: f64,

    /// Tabulate the synthetic profile on this many points before expanding it.
    #[arg(long)]
    pub samples: Option<usize>,

    /// Gaussian noise added to tabulated samples, relative to the peak.
    #[arg(long, default_value_t = 0.0)]
    pub noise: f64,

    /// Random seed for the noise.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Expansion orders (comma separated, each at least 2).
    #[arg(short = 'm', long, value_delimiter = ',', default_values_t = vec![4, 6, 8])]
    pub orders: Vec<usize>,

    /// Fixed envelope amplitude (fit when any of the three is missing).
    #[arg(long = "env-amplitude")]
    pub env_amplitude: Option<f64>,

    /// Fixed envelope center.
    #[arg(long = "env-center", allow_negative_numbers = true)]
    pub env_center: Option<f64>,

    /// Fixed envelope width.
    #[arg(long = "env-width")]
    pub env_width: Option<f64>,

    /// Which parameters the envelope fit moves.
    #[arg(long, value_enum, default_value_t = FitStrategy::EnvelopeOnly)]
    pub strategy: FitStrategy,

    /// Relative tolerance of the envelope fit.
    #[arg(long, default_value_t = 1e-6)]
    pub tolerance: f64,

    /// Evaluation budget of the envelope fit.
    #[arg(long, default_value_t = 100)]
    pub max_evaluations: usize,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 90)]
    pub plot_width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 22)]
    pub plot_height: usize,

    /// Export expansions to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,
}

/// Options of `gh matrix`.
#[derive(Debug, Parser, Clone)]
pub struct MatrixArgs {
    /// B-spline degree (0..=3).
    #[arg(short = 'd', long, default_value_t = 3)]
    pub degree: usize,

    /// Explicit breakpoints (comma separated); overrides the uniform grid.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub grid: Option<Vec<f64>>,

    /// Left end of the uniform grid.
    #[arg(long, default_value_t = -5.0, allow_negative_numbers = true)]
    pub grid_min: f64,

    /// Right end of the uniform grid.
    #[arg(long, default_value_t = 5.0, allow_negative_numbers = true)]
    pub grid_max: f64,

    /// Number of breakpoints of the uniform grid.
    #[arg(long, default_value_t = 11)]
    pub grid_size: usize,

    /// Highest GH order.
    #[arg(short = 'm', long, default_value_t = 4)]
    pub order: usize,

    /// Envelope amplitude.
    #[arg(long = "env-amplitude", default_value_t = 1.0)]
    pub env_amplitude: f64,

    /// Envelope center.
    #[arg(long = "env-center", default_value_t = 0.0, allow_negative_numbers = true)]
    pub env_center: f64,

    /// Envelope width.
    #[arg(long = "env-width", default_value_t = 1.0)]
    pub env_width: f64,

    /// Export the matrix to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,
}

/// Options of `gh plot`.
#[derive(Debug, Parser, Clone)]
pub struct PlotArgs {
    /// Expansion JSON written by `gh fit --export`.
    #[arg(long, value_name = "JSON")]
    pub from: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 90)]
    pub plot_width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 22)]
    pub plot_height: usize,
}
