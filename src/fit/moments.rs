//! Classic moments of a function over the whole real line.
//!
//! ```text
//! norm   =   ∫ f(x) dx
//! mean   =  (∫ f(x) x dx) / norm
//! stddev = ((∫ f(x) x² dx) / norm − mean²)^{1/2}
//! ```
//!
//! The integrals run over `z ∈ [0, 1]` with `x = exp(1/(1−z) − 1/z)`, which maps
//! `z = 0` to `x = 0` and `z = 1` to `x = +∞`; evaluating `f(±x)` at each node
//! covers both half-lines in one sweep. The result only seeds the nonlinear fit,
//! so a loose tolerance and a small evaluation budget are enough.

use crate::domain::{Moments, ScalarFunction};
use crate::math::integrate_adaptive;

/// Relative accuracy of the moment integrals.
pub const EPSREL_MOMENTS: f64 = 1e-3;

/// Evaluation budget of the moment integrals.
pub const MAX_EVALS_MOMENTS: usize = 1000;

/// Integrands of the 0th, 1st and 2nd moment at the scaled variable `z`.
fn moments_integrand<F: ScalarFunction + ?Sized>(fnc: &F, z: f64, out: &mut [f64]) {
    let x = (1.0 / (1.0 - z) - 1.0 / z).exp();
    let j = x * (1.0 / ((1.0 - z) * (1.0 - z)) + 1.0 / (z * z));
    let fp = fnc.value(x);
    let fm = fnc.value(-x);
    if (fp == 0.0 && fm == 0.0) || !j.is_finite() {
        out[..3].fill(0.0);
    } else {
        out[0] = (fp + fm) * j;
        out[1] = (fp - fm) * j * x;
        out[2] = (fp + fm) * j * x * x;
    }
}

/// Estimate normalization, mean and dispersion of `fnc`.
///
/// A vanishing normalization yields zero mean and dispersion instead of NaN.
pub fn estimate_moments<F: ScalarFunction + ?Sized>(fnc: &F) -> Moments {
    let res = integrate_adaptive(
        |z, out| moments_integrand(fnc, z, out),
        3,
        0.0,
        1.0,
        EPSREL_MOMENTS,
        MAX_EVALS_MOMENTS,
    );
    let [m0, m1, m2] = [res.values[0], res.values[1], res.values[2]];
    log::debug!(
        "moments: integrals=({m0:.6e}, {m1:.6e}, {m2:.6e}), evaluations={}, converged={}",
        res.evaluations,
        res.converged
    );

    if m0 == 0.0 {
        return Moments {
            norm: 0.0,
            mean: 0.0,
            stddev: 0.0,
        };
    }
    let mean = m1 / m0;
    let stddev = (m2 / m0 - mean * mean).max(0.0).sqrt();
    Moments {
        norm: m0,
        mean,
        stddev,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn gaussian(ampl: f64, center: f64, width: f64) -> impl Fn(f64) -> f64 {
        move |x| {
            let y = (x - center) / width;
            ampl / (width * (2.0 * PI).sqrt()) * (-0.5 * y * y).exp()
        }
    }

    #[test]
    fn gaussian_moments_within_seed_accuracy() {
        let m = estimate_moments(&gaussian(2.0, 0.4, 1.3));
        assert!((m.norm - 2.0).abs() < 2e-2 * 2.0, "{m:?}");
        assert!((m.mean - 0.4).abs() < 5e-2, "{m:?}");
        assert!((m.stddev - 1.3).abs() < 5e-2, "{m:?}");
    }

    #[test]
    fn asymmetric_function_has_shifted_mean() {
        // exponential distribution on x > 0 with rate 1: mean 1, stddev 1
        let f = |x: f64| if x > 0.0 { (-x).exp() } else { 0.0 };
        let m = estimate_moments(&f);
        assert!((m.norm - 1.0).abs() < 2e-2, "{m:?}");
        assert!((m.mean - 1.0).abs() < 5e-2, "{m:?}");
        assert!((m.stddev - 1.0).abs() < 5e-2, "{m:?}");
    }

    #[test]
    fn zero_function_gives_zero_moments() {
        let m = estimate_moments(&|_x: f64| 0.0);
        assert_eq!(m, Moments::default());
    }

    #[test]
    fn integrand_never_produces_non_finite_values() {
        let f = gaussian(1.0, 0.0, 1.0);
        let mut out = [0.0; 3];
        for z in [1e-12, 1e-3, 0.5, 0.999, 1.0 - 1e-12] {
            moments_integrand(&f, z, &mut out);
            assert!(out.iter().all(|v| v.is_finite()), "z={z}: {out:?}");
        }
    }
}
