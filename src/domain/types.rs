//! Shared domain types.
//!
//! These types are small, `Copy` where possible and serializable so they can be:
//!
//! - passed around during fitting without lifetimes
//! - exported to JSON next to the coefficient vectors
//! - built from CLI flags in one place (`app::*_config_from_args`)

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::GhError;
use crate::math::LmConfig;

/// The base Gaussian of a GH expansion.
///
/// `amplitude` is the integral of the Gaussian, `width` its dispersion:
/// `G(x) = amplitude / (width √(2π)) · exp(−(x − center)² / (2 width²))`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub amplitude: f64,
    pub center: f64,
    pub width: f64,
}

impl Envelope {
    pub fn new(amplitude: f64, center: f64, width: f64) -> Self {
        Self {
            amplitude,
            center,
            width,
        }
    }

    /// All three parameters are finite (an explicit envelope, no fit needed).
    pub fn is_finite(&self) -> bool {
        self.amplitude.is_finite() && self.center.is_finite() && self.width.is_finite()
    }

    /// Check the envelope can be used to scale an integration.
    pub fn validate(&self) -> Result<(), GhError> {
        let reason = if !self.is_finite() {
            "parameters must be finite"
        } else if self.amplitude == 0.0 {
            "amplitude must be non-zero"
        } else if self.width <= 0.0 {
            "width must be positive"
        } else {
            return Ok(());
        };
        Err(GhError::InvalidEnvelope {
            amplitude: self.amplitude,
            center: self.center,
            width: self.width,
            reason,
        })
    }

    /// Scaled coordinate `y = (x − center) / width`.
    pub fn scaled(&self, x: f64) -> f64 {
        (x - self.center) / self.width
    }
}

/// Total normalization, mean and dispersion of a function over the real line.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Moments {
    pub norm: f64,
    pub mean: f64,
    pub stddev: f64,
}

/// Which parameters the nonlinear fit is allowed to move.
///
/// Both variants keep `h_0 = 1`, `h_1 = h_2 = 0` fixed.
///
/// - `EnvelopeOnly` fits amplitude, center and width of the base Gaussian
///   alone. The 0th basis function then does not depend on the expansion
///   order, raising the order never changes lower terms, and the integrated
///   `h_1`, `h_2` come out (close to) zero.
/// - `EnvelopeAndShape` additionally fits `h_3 ..= h_M`. The best-fit center
///   and width then depend on `M`, and the integrated `h_1`, `h_2` are in
///   general non-zero even though the fit ignored them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FitStrategy {
    #[default]
    #[value(name = "envelope")]
    EnvelopeOnly,
    #[value(name = "joint")]
    EnvelopeAndShape,
}

impl FitStrategy {
    /// Highest GH order whose coefficients take part in the fit.
    pub fn fit_order(self, order: usize) -> usize {
        match self {
            FitStrategy::EnvelopeOnly => 2,
            FitStrategy::EnvelopeAndShape => order,
        }
    }
}

/// How to build a [`crate::models::GaussHermiteExpansion`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpansionConfig {
    /// Highest Hermite degree `M` (at least 2).
    pub order: usize,
    /// Explicit envelope; `None` (or any non-finite parameter) triggers a fit.
    pub envelope: Option<Envelope>,
    pub strategy: FitStrategy,
    pub lm: LmConfig,
}

impl ExpansionConfig {
    pub fn new(order: usize) -> Self {
        Self {
            order,
            envelope: None,
            strategy: FitStrategy::default(),
            lm: LmConfig::default(),
        }
    }

    pub fn with_envelope(mut self, envelope: Envelope) -> Self {
        self.envelope = Some(envelope);
        self
    }

    pub fn with_strategy(mut self, strategy: FitStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

/// Diagnostics of the nonlinear envelope fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    pub strategy: FitStrategy,
    /// Moment estimate used as the starting point.
    pub seed: Moments,
    pub converged: bool,
    pub iterations: usize,
    pub evaluations: usize,
    /// `½ Σ r²` at the solution.
    pub cost: f64,
    /// Fitted `h_3 ..= h_M` (empty for the envelope-only strategy).
    pub shape: Vec<f64>,
}

/// Synthetic profile families used by the CLI and the tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ProfileKind {
    /// A single Gaussian.
    Gaussian,
    /// A Gaussian distorted by `h_3`, `h_4` terms.
    GaussHermite,
    /// A mixture of two Gaussians (asymmetric when the components differ).
    DoubleGaussian,
}

/// Parameters of a synthetic profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSpec {
    pub kind: ProfileKind,
    pub amplitude: f64,
    pub center: f64,
    pub width: f64,
    /// Third/fourth GH terms (`GaussHermite` only).
    pub h3: f64,
    pub h4: f64,
    /// Fraction of the amplitude in the second component (`DoubleGaussian` only).
    pub mix_fraction: f64,
    pub mix_offset: f64,
    pub mix_width: f64,
}

impl Default for ProfileSpec {
    fn default() -> Self {
        Self {
            kind: ProfileKind::Gaussian,
            amplitude: 1.0,
            center: 0.0,
            width: 1.0,
            h3: 0.0,
            h4: 0.0,
            mix_fraction: 0.3,
            mix_offset: 1.5,
            mix_width: 0.6,
        }
    }
}

/// Optional tabulation of a profile with Gaussian noise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingSpec {
    pub samples: usize,
    /// Noise standard deviation relative to the profile peak.
    pub noise: f64,
    pub seed: u64,
}

/// A full `gh fit` run as understood by the pipeline.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub profile: ProfileSpec,
    /// Tabulate (and perturb) the profile before expanding it.
    pub sampling: Option<SamplingSpec>,
    /// Read a tabulated `(x, f)` profile instead of a synthetic one.
    pub input_csv: Option<PathBuf>,
    pub orders: Vec<usize>,
    pub envelope: Option<Envelope>,
    pub strategy: FitStrategy,
    pub lm: LmConfig,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub export: Option<PathBuf>,
}

/// A `gh matrix` run.
#[derive(Debug, Clone)]
pub struct MatrixConfig {
    pub degree: usize,
    pub grid: Vec<f64>,
    pub order: usize,
    pub envelope: Envelope,
    pub export: Option<PathBuf>,
}
