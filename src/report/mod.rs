//! Reporting utilities: reconstruction quality and formatted terminal output.

use serde::Serialize;

use crate::domain::ScalarFunction;
use crate::error::GhError;
use crate::models::GaussHermiteExpansion;

pub mod format;

pub use format::*;

/// How well an expansion reproduces its profile on a uniform grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReconstructionQuality {
    pub order: usize,
    /// Root-mean-square of `profile − expansion`.
    pub rms: f64,
    pub max_abs: f64,
    /// `‖profile − expansion‖₂ / ‖profile‖₂` (0 for a vanishing profile).
    pub relative_l2: f64,
}

/// Compare `gh` with `profile` on `points` equally spaced nodes of `range`.
pub fn compute_quality<F: ScalarFunction + ?Sized>(
    profile: &F,
    gh: &GaussHermiteExpansion,
    range: (f64, f64),
    points: usize,
) -> Result<ReconstructionQuality, GhError> {
    let (lo, hi) = range;
    let n = points.max(2);
    let mut sum_sq = 0.0;
    let mut sum_ref = 0.0;
    let mut max_abs: f64 = 0.0;
    for i in 0..n {
        let x = lo + (hi - lo) * i as f64 / (n - 1) as f64;
        let f = profile.value(x);
        let g = gh.value(x);
        if !(f.is_finite() && g.is_finite()) {
            return Err(GhError::DegenerateProfile(format!(
                "non-finite value at x={x} (profile={f}, order {} expansion={g})",
                gh.order()
            )));
        }
        let r = f - g;
        sum_sq += r * r;
        sum_ref += f * f;
        max_abs = max_abs.max(r.abs());
    }
    Ok(ReconstructionQuality {
        order: gh.order(),
        rms: (sum_sq / n as f64).sqrt(),
        max_abs,
        relative_l2: if sum_ref > 0.0 {
            (sum_sq / sum_ref).sqrt()
        } else {
            0.0
        },
    })
}
