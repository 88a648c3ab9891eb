//! Hermite polynomials in the normalization used by GH expansions.
//!
//! These are neither the "physicist's" nor the "probabilist's" polynomials but a
//! rescaled family with:
//!
//! - `H_0 = 1`, `H_1 = √2 x`
//! - `H_{n+1} = (√2 x H_n − √n H_{n−1}) / √(n+1)`
//! - `dH_n/dx = √(2n) H_{n−1}`
//! - `∫ H_n H_m exp(−x²) dx / (2π) = δ_nm / (2√π)`
//! - `∫ H_n exp(−x²/2) dx / √(2π) = √(n!) / n!!` for even `n`, zero for odd `n`
//!
//! With this normalization the coefficients `h_3`, `h_4` of an expansion are the
//! usual skewness/kurtosis-like shape parameters of a velocity distribution.

use std::f64::consts::SQRT_2;

/// `√n` for `n = 1..=8`, indexed by `n - 1`.
const SQRT_TABLE: [f64; 8] = [
    1.0,
    SQRT_2,
    1.732_050_807_568_877_2,
    2.0,
    2.236_067_977_499_79,
    2.449_489_742_783_178,
    2.645_751_311_064_590_7,
    2.828_427_124_746_190_3,
];

/// Fill `out[0..=nmax]` with `H_0(x) ..= H_nmax(x)`.
///
/// # Panics
/// Panics if `out.len() <= nmax`.
pub fn hermite_array(nmax: usize, x: f64, out: &mut [f64]) {
    out[0] = 1.0;
    if nmax == 0 {
        return;
    }
    out[1] = SQRT_2 * x;
    let mut sqrt_n = 1.0;
    for n in 1..nmax {
        let sqrt_n1 = if n < SQRT_TABLE.len() {
            SQRT_TABLE[n]
        } else {
            ((n + 1) as f64).sqrt()
        };
        out[n + 1] = (SQRT_2 * x * out[n] - sqrt_n * out[n - 1]) / sqrt_n1;
        sqrt_n = sqrt_n1;
    }
}

/// Allocating convenience wrapper around [`hermite_array`].
pub fn hermite_values(nmax: usize, x: f64) -> Vec<f64> {
    let mut out = vec![0.0; nmax + 1];
    hermite_array(nmax, x, &mut out);
    out
}

/// Integral of the `n`-th GH basis function over the real line,
/// `∫ H_n(y) exp(−y²/2) dy / √(2π)`.
pub fn normn(n: usize) -> f64 {
    if n % 2 == 1 {
        return 0.0;
    }
    match n {
        0 => 1.0,
        2 => std::f64::consts::FRAC_1_SQRT_2,
        4 => 0.612_372_435_695_794_5, // √6/4
        6 => 0.559_016_994_374_947_4, // √5/4
        8 => 0.522_912_516_583_797_2, // √70/16
        _ => {
            // √(n!)/n!! == √((n−1)!!/n!!) for even n
            let mut ratio = 1.0;
            for k in 1..=n / 2 {
                ratio *= (2 * k - 1) as f64 / (2 * k) as f64;
            }
            ratio.sqrt()
        }
    }
}
