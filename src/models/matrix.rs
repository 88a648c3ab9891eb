//! Linear map from piecewise-polynomial coefficients to GH coefficients.
//!
//! If `f(x) = Σ_j a_j B_j(x)`, the direct GH integral is linear in `a`:
//!
//! ```text
//! h_m = Σ_j M[m, j] a_j,   M[m, j] = √2 / amplitude · ∫ B_j(x) H_m(y) exp(−y²/2) dx
//! ```
//!
//! with `y = (x − center) / width`. Each `B_j` is a polynomial on every grid
//! segment, so the integral is done segment by segment with Gauss-Legendre
//! quadrature. The exponential is not polynomial, hence the rule is sized for
//! the polynomial part plus a small margin rather than exactly.

use std::f64::consts::SQRT_2;

use nalgebra::{DMatrix, DVector};

use crate::basis::{BsplineBasis, PiecewiseBasis, SplineDegree, validate_grid};
use crate::domain::Envelope;
use crate::error::GhError;
use crate::math::{MAX_GL_NODES, gauss_legendre, hermite_array};

/// Dense `(order + 1) × num_functions` basis-to-GH matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussHermiteMatrix {
    matrix: DMatrix<f64>,
    envelope: Envelope,
}

impl GaussHermiteMatrix {
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn order(&self) -> usize {
        self.matrix.nrows() - 1
    }

    pub fn num_functions(&self) -> usize {
        self.matrix.ncols()
    }

    /// Row `m` of the matrix.
    pub fn row(&self, m: usize) -> Vec<f64> {
        self.matrix.row(m).iter().copied().collect()
    }

    /// GH coefficients `M · coefs` of the function with basis coefficients `coefs`.
    pub fn apply(&self, coefs: &[f64]) -> Result<Vec<f64>, GhError> {
        if coefs.len() != self.num_functions() {
            return Err(GhError::DimensionMismatch {
                expected: self.num_functions(),
                found: coefs.len(),
            });
        }
        let h = &self.matrix * DVector::from_column_slice(coefs);
        Ok(h.iter().copied().collect())
    }
}

/// Gauss-Legendre nodes per segment for a basis of degree `degree`.
fn nodes_per_segment(degree: usize, order: usize) -> usize {
    MAX_GL_NODES.min(3.max((degree + order + 1) / 2 + 1))
}

/// Build the matrix for an arbitrary piecewise-polynomial basis.
pub fn gauss_hermite_matrix_for<B: PiecewiseBasis + ?Sized>(
    basis: &B,
    order: usize,
    envelope: &Envelope,
) -> Result<GaussHermiteMatrix, GhError> {
    envelope.validate()?;
    let grid = basis.breakpoints();
    validate_grid(grid)?;

    let degree = basis.degree();
    let ncols = basis.num_functions();
    let rule = gauss_legendre(nodes_per_segment(degree, order));
    let scale = SQRT_2 / envelope.amplitude;

    let mut matrix = DMatrix::zeros(order + 1, ncols);
    let mut hpoly = vec![0.0; order + 1];
    let mut bvals = vec![0.0; degree + 1];
    for seg in grid.windows(2) {
        let (x0, dx) = (seg[0], seg[1] - seg[0]);
        for (t, wk) in rule.nodes.iter().zip(rule.weights.iter()) {
            let x = x0 + dx * t;
            let y = envelope.scaled(x);
            let left = basis.nonzero_components(x, &mut bvals);
            hermite_array(order, y, &mut hpoly);
            let mult = scale * dx * wk * (-0.5 * y * y).exp();
            for (b, bv) in bvals.iter().enumerate() {
                let col = left + b;
                debug_assert!(col < ncols);
                for (m, hm) in hpoly.iter().enumerate() {
                    matrix[(m, col)] += mult * hm * bv;
                }
            }
        }
    }

    log::debug!(
        "GH matrix: degree={degree}, order={order}, {} segments x {} nodes, {ncols} functions",
        grid.len() - 1,
        rule.len()
    );
    Ok(GaussHermiteMatrix {
        matrix,
        envelope: *envelope,
    })
}

/// Build the matrix for a clamped B-spline basis of runtime `degree` over `grid`.
pub fn gauss_hermite_matrix(
    degree: usize,
    grid: &[f64],
    order: usize,
    envelope: &Envelope,
) -> Result<GaussHermiteMatrix, GhError> {
    match SplineDegree::try_from(degree)? {
        SplineDegree::Degree0 => {
            gauss_hermite_matrix_for(&BsplineBasis::<0>::new(grid)?, order, envelope)
        }
        SplineDegree::Degree1 => {
            gauss_hermite_matrix_for(&BsplineBasis::<1>::new(grid)?, order, envelope)
        }
        SplineDegree::Degree2 => {
            gauss_hermite_matrix_for(&BsplineBasis::<2>::new(grid)?, order, envelope)
        }
        SplineDegree::Degree3 => {
            gauss_hermite_matrix_for(&BsplineBasis::<3>::new(grid)?, order, envelope)
        }
    }
}
