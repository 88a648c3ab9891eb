//! Dense least squares solver.
//!
//! The Levenberg-Marquardt step in [`crate::math::lm`] is posed as a small,
//! tall least squares problem
//!
//! ```text
//! minimize ‖J δ + r‖² + λ ‖D δ‖²
//! ```
//!
//! which we solve by stacking `[J; √λ D]` and `[−r; 0]` and handing the result to
//! an SVD. The parameter count is tiny (3 to ~10 columns), so SVD cost is
//! irrelevant and its robustness against near-collinear columns is welcome.
//! (Nalgebra's `QR::solve` is for square systems and panics on tall ones.)

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Progressively looser singular-value cutoffs before giving up.
    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solves_overdetermined_quadratic() {
        // y = 1 - 2x + 0.5x² sampled at five points
        let xs = [-2.0, -1.0, 0.0, 1.0, 2.0];
        let mut data = Vec::new();
        let mut rhs = Vec::new();
        for &x in &xs {
            data.extend_from_slice(&[1.0, x, x * x]);
            rhs.push(1.0 - 2.0 * x + 0.5 * x * x);
        }
        let a = DMatrix::from_row_slice(xs.len(), 3, &data);
        let b = DVector::from_vec(rhs);

        let beta = solve_least_squares(&a, &b).unwrap();
        assert!((beta[0] - 1.0).abs() < 1e-10);
        assert!((beta[1] + 2.0).abs() < 1e-10);
        assert!((beta[2] - 0.5).abs() < 1e-10);
    }
}
