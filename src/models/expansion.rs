//! The GH expansion of a function.
//!
//! ```text
//! f(x) ≈ amplitude / (width √(2π)) · exp(−y²/2) · Σ_{i=0}^{M} h_i H_i(y),   y = (x − center) / width
//! ```
//!
//! Construction either takes an explicit envelope and integrates the
//! coefficients directly, or first fits the envelope (see [`crate::fit`]) and
//! then integrates all `M + 1` coefficients with the fitted envelope. The
//! result is immutable.

use serde::Serialize;

use crate::domain::{Envelope, ExpansionConfig, FitReport, ScalarFunction};
use crate::error::GhError;
use crate::fit::fit_envelope;
use crate::math::{hermite_array, normn};
use crate::models::gauss_hermite_coefficients;

const FRAC_1_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

/// Lowest supported expansion order.
pub const MIN_ORDER: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaussHermiteExpansion {
    envelope: Envelope,
    coefficients: Vec<f64>,
    /// Present when the envelope was fitted rather than given.
    fit: Option<FitReport>,
}

impl GaussHermiteExpansion {
    /// Expand `fnc` up to `order`. A missing envelope, or one with any
    /// non-finite parameter, is fitted with the default settings.
    pub fn new<F: ScalarFunction + ?Sized>(
        fnc: &F,
        order: usize,
        envelope: Option<Envelope>,
    ) -> Result<Self, GhError> {
        let config = ExpansionConfig {
            envelope,
            ..ExpansionConfig::new(order)
        };
        Self::from_config(fnc, &config)
    }

    /// Expand `fnc` with a fixed envelope.
    pub fn with_envelope<F: ScalarFunction + ?Sized>(
        fnc: &F,
        order: usize,
        envelope: Envelope,
    ) -> Result<Self, GhError> {
        Self::new(fnc, order, Some(envelope))
    }

    /// Expand `fnc` around its best-fit Gaussian.
    pub fn fit<F: ScalarFunction + ?Sized>(fnc: &F, order: usize) -> Result<Self, GhError> {
        Self::new(fnc, order, None)
    }

    pub fn from_config<F: ScalarFunction + ?Sized>(
        fnc: &F,
        config: &ExpansionConfig,
    ) -> Result<Self, GhError> {
        if config.order < MIN_ORDER {
            return Err(GhError::InvalidOrder(config.order));
        }

        let (envelope, fit) = match config.envelope.filter(Envelope::is_finite) {
            Some(envelope) => (envelope, None),
            None => {
                let (envelope, report) =
                    fit_envelope(fnc, config.order, config.strategy, &config.lm)?;
                (envelope, Some(report))
            }
        };
        let coefficients = gauss_hermite_coefficients(fnc, config.order, &envelope)?;
        log::debug!(
            "GH expansion of order {}: {envelope:?}, h0={:.6}",
            config.order,
            coefficients[0]
        );

        Ok(Self {
            envelope,
            coefficients,
            fit,
        })
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn amplitude(&self) -> f64 {
        self.envelope.amplitude
    }

    pub fn center(&self) -> f64 {
        self.envelope.center
    }

    pub fn width(&self) -> f64 {
        self.envelope.width
    }

    /// `h_0 ..= h_M`.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn order(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    pub fn fit_report(&self) -> Option<&FitReport> {
        self.fit.as_ref()
    }

    /// Reconstructed function at `x`.
    pub fn value(&self, x: f64) -> f64 {
        if self.coefficients.is_empty() {
            return 0.0;
        }
        let y = self.envelope.scaled(x);
        let mut hpoly = vec![0.0; self.coefficients.len()];
        hermite_array(self.order(), y, &mut hpoly);
        let series: f64 = self
            .coefficients
            .iter()
            .zip(hpoly.iter())
            .map(|(h, hp)| h * hp)
            .sum();
        self.envelope.amplitude / self.envelope.width
            * FRAC_1_SQRT_2PI
            * (-0.5 * y * y).exp()
            * series
    }

    /// Integral of the expansion over the real line.
    pub fn norm(&self) -> f64 {
        let sum: f64 = self
            .coefficients
            .iter()
            .enumerate()
            .step_by(2)
            .map(|(n, h)| h * normn(n))
            .sum();
        self.envelope.amplitude * sum
    }
}

impl ScalarFunction for GaussHermiteExpansion {
    fn value(&self, x: f64) -> f64 {
        GaussHermiteExpansion::value(self, x)
    }
}
