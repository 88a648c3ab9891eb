//! Piecewise-polynomial bases consumed by the basis-to-GH matrix builder.
//!
//! The builder only needs a local query: "which functions are non-zero at `x`,
//! and what are their values". Any basis that can answer it implements
//! [`PiecewiseBasis`]; the crate ships clamped B-splines of degree 0..=3.

use serde::{Deserialize, Serialize};

use crate::error::GhError;

pub mod bspline;

pub use bspline::*;
pub(crate) use bspline::validate_grid;

/// Highest B-spline degree supported by the runtime dispatch.
pub const MAX_SPLINE_DEGREE: usize = 3;

pub trait PiecewiseBasis {
    /// Polynomial degree `N`; every point has at most `N + 1` non-zero functions.
    fn degree(&self) -> usize;

    /// Breakpoints (segment boundaries), strictly increasing.
    fn breakpoints(&self) -> &[f64];

    /// Total number of basis functions.
    fn num_functions(&self) -> usize;

    /// Write the values of the `degree() + 1` possibly non-zero functions at `x`
    /// into `values` and return the global index of the first one.
    fn nonzero_components(&self, x: f64, values: &mut [f64]) -> usize;

    /// `Σ_j coefs[j] · B_j(x)`.
    fn evaluate(&self, x: f64, coefs: &[f64]) -> f64 {
        let mut values = vec![0.0; self.degree() + 1];
        let start = self.nonzero_components(x, &mut values);
        values
            .iter()
            .enumerate()
            .filter_map(|(b, v)| coefs.get(start + b).map(|c| c * v))
            .sum()
    }
}

/// Runtime selector for the supported B-spline degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplineDegree {
    Degree0,
    Degree1,
    Degree2,
    Degree3,
}

impl SplineDegree {
    pub fn degree(self) -> usize {
        match self {
            SplineDegree::Degree0 => 0,
            SplineDegree::Degree1 => 1,
            SplineDegree::Degree2 => 2,
            SplineDegree::Degree3 => 3,
        }
    }
}

impl TryFrom<usize> for SplineDegree {
    type Error = GhError;

    fn try_from(degree: usize) -> Result<Self, Self::Error> {
        match degree {
            0 => Ok(SplineDegree::Degree0),
            1 => Ok(SplineDegree::Degree1),
            2 => Ok(SplineDegree::Degree2),
            3 => Ok(SplineDegree::Degree3),
            other => Err(GhError::UnsupportedDegree(other)),
        }
    }
}
