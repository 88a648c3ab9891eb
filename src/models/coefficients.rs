//! GH coefficients of an explicit function for a fixed envelope.
//!
//! ```text
//! h_m = √2 · width / amplitude · ∫ f(center + width·y) H_m(y) exp(−y²/2) dy
//! ```
//!
//! For a polynomial `f` the integral would be exact under Gauss-Hermite
//! quadrature, but our functions are at best piecewise polynomial. Instead we
//! use `2Q² + 1` equally spaced nodes `y = −Q, …, −1/Q, 0, 1/Q, …, Q`:
//!
//! ```text
//! ∫ g(y) exp(−y²) dy ≈ (1/Q) Σ_{i=−Q²}^{Q²} g(i/Q) exp(−(i/Q)²)
//! ```
//!
//! which is simple, stable and, for smooth rapidly decaying integrands,
//! remarkably accurate. Even/odd symmetry of `H_m` lets each pair `±y` share a
//! single Hermite evaluation.

use std::f64::consts::SQRT_2;

use crate::domain::{Envelope, ScalarFunction};
use crate::error::GhError;
use crate::math::hermite_array;

/// `Q`: nodes are spaced `1/Q` apart and reach `|y| = Q`.
pub const QUADORDER: usize = 7;

/// `2Q² + 1`.
pub const NUM_QUAD_NODES: usize = 2 * QUADORDER * QUADORDER + 1;

/// Coefficients `h_0 ..= h_order` of `fnc` for the given envelope.
pub fn gauss_hermite_coefficients<F: ScalarFunction + ?Sized>(
    fnc: &F,
    order: usize,
    envelope: &Envelope,
) -> Result<Vec<f64>, GhError> {
    envelope.validate()?;
    let Envelope {
        amplitude,
        center,
        width,
    } = *envelope;

    let q = QUADORDER as f64;
    let mut hpoly = vec![0.0; order + 1];
    let mut result = vec![0.0; order + 1];
    for p in 0..=QUADORDER * QUADORDER {
        let y = p as f64 / q;
        let mult = SQRT_2 * width / amplitude / q * (-0.5 * y * y).exp();
        let fp = fnc.value(center + width * y);
        let fm = if p == 0 { 0.0 } else { fnc.value(center - width * y) };
        hermite_array(order, y, &mut hpoly);
        let (even, odd) = (fp + fm, fp - fm);
        for (i, (r, h)) in result.iter_mut().zip(hpoly.iter()).enumerate() {
            let sym = if i % 2 == 1 { odd } else { even };
            *r += mult * sym * h;
        }
    }
    Ok(result)
}
