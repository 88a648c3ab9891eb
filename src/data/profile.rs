//! Profiles to expand: analytic synthetic families and tabulated samples.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{Envelope, ProfileKind, ProfileSpec, SamplingSpec, ScalarFunction};
use crate::error::GhError;
use crate::math::hermite_values;

const FRAC_1_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

/// Half-width of the plotting/tabulation range in units of the widest dispersion.
const RANGE_SIGMAS: f64 = 6.0;

fn gaussian(amplitude: f64, center: f64, width: f64, x: f64) -> f64 {
    let y = (x - center) / width;
    amplitude / width * FRAC_1_SQRT_2PI * (-0.5 * y * y).exp()
}

/// An analytic profile built from a validated [`ProfileSpec`].
#[derive(Debug, Clone)]
pub struct SyntheticProfile {
    spec: ProfileSpec,
}

impl SyntheticProfile {
    pub fn new(spec: ProfileSpec) -> Result<Self, GhError> {
        let ProfileSpec {
            amplitude,
            center,
            width,
            h3,
            h4,
            mix_fraction,
            mix_offset,
            mix_width,
            ..
        } = spec;
        let all_finite = [amplitude, center, width, h3, h4, mix_fraction, mix_offset, mix_width]
            .iter()
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(GhError::InvalidProfile(
                "profile parameters must be finite".to_string(),
            ));
        }
        if width <= 0.0 {
            return Err(GhError::InvalidProfile(format!(
                "width must be positive (got {width})"
            )));
        }
        if spec.kind == ProfileKind::DoubleGaussian {
            if mix_width <= 0.0 {
                return Err(GhError::InvalidProfile(format!(
                    "mix width must be positive (got {mix_width})"
                )));
            }
            if !(0.0..=1.0).contains(&mix_fraction) {
                return Err(GhError::InvalidProfile(format!(
                    "mix fraction must lie in [0, 1] (got {mix_fraction})"
                )));
            }
        }
        Ok(Self { spec })
    }

    pub fn spec(&self) -> &ProfileSpec {
        &self.spec
    }

    /// Interval holding all but a negligible part of the profile.
    pub fn range(&self) -> (f64, f64) {
        let s = &self.spec;
        let lo = s.center - RANGE_SIGMAS * s.width;
        let hi = s.center + RANGE_SIGMAS * s.width;
        match s.kind {
            ProfileKind::DoubleGaussian => {
                let c2 = s.center + s.mix_offset;
                (
                    lo.min(c2 - RANGE_SIGMAS * s.mix_width),
                    hi.max(c2 + RANGE_SIGMAS * s.mix_width),
                )
            }
            _ => (lo, hi),
        }
    }

    /// Analytic integral over the real line.
    pub fn integral(&self) -> f64 {
        let s = &self.spec;
        match s.kind {
            ProfileKind::GaussHermite => s.amplitude * (1.0 + s.h4 * crate::math::normn(4)),
            _ => s.amplitude,
        }
    }
}

impl ScalarFunction for SyntheticProfile {
    fn value(&self, x: f64) -> f64 {
        let s = &self.spec;
        match s.kind {
            ProfileKind::Gaussian => gaussian(s.amplitude, s.center, s.width, x),
            ProfileKind::GaussHermite => {
                let env = Envelope::new(s.amplitude, s.center, s.width);
                let hp = hermite_values(4, env.scaled(x));
                gaussian(s.amplitude, s.center, s.width, x) * (1.0 + s.h3 * hp[3] + s.h4 * hp[4])
            }
            ProfileKind::DoubleGaussian => {
                let first = (1.0 - s.mix_fraction) * s.amplitude;
                let second = s.mix_fraction * s.amplitude;
                gaussian(first, s.center, s.width, x)
                    + gaussian(second, s.center + s.mix_offset, s.mix_width, x)
            }
        }
    }
}

/// A profile known on a grid, linearly interpolated in between and zero outside.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledProfile {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl SampledProfile {
    /// `xs` must be finite and strictly increasing, with one finite `ys` per node.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> Result<Self, GhError> {
        if xs.len() != ys.len() {
            return Err(GhError::DimensionMismatch {
                expected: xs.len(),
                found: ys.len(),
            });
        }
        if xs.len() < 2 {
            return Err(GhError::InvalidProfile(format!(
                "need at least 2 samples, got {}",
                xs.len()
            )));
        }
        if xs.iter().chain(ys.iter()).any(|v| !v.is_finite()) {
            return Err(GhError::InvalidProfile(
                "samples must be finite".to_string(),
            ));
        }
        if xs.windows(2).any(|w| w[1] <= w[0]) {
            return Err(GhError::InvalidProfile(
                "sample abscissae must be strictly increasing".to_string(),
            ));
        }
        Ok(Self { xs, ys })
    }

    /// Tabulate `fnc` on `samples` equally spaced points of `[lo, hi]`.
    pub fn tabulate<F: ScalarFunction + ?Sized>(
        fnc: &F,
        lo: f64,
        hi: f64,
        samples: usize,
    ) -> Result<Self, GhError> {
        if samples < 2 || !(hi > lo) {
            return Err(GhError::InvalidProfile(format!(
                "cannot tabulate {samples} samples on [{lo}, {hi}]"
            )));
        }
        let step = (hi - lo) / (samples - 1) as f64;
        let xs: Vec<f64> = (0..samples).map(|i| lo + step * i as f64).collect();
        let ys = xs.iter().map(|&x| fnc.value(x)).collect();
        Self::new(xs, ys)
    }

    /// Add Gaussian noise of dispersion `noise · max|f|`, reproducibly seeded.
    pub fn with_noise(mut self, noise: f64, seed: u64) -> Result<Self, GhError> {
        if !(noise.is_finite() && noise >= 0.0) {
            return Err(GhError::InvalidProfile(format!(
                "noise must be a non-negative number (got {noise})"
            )));
        }
        if noise == 0.0 {
            return Ok(self);
        }
        let peak = self.ys.iter().fold(0.0_f64, |m, y| m.max(y.abs()));
        let mut rng = StdRng::seed_from_u64(seed);
        let normal = Normal::new(0.0, noise * peak)
            .map_err(|e| GhError::InvalidProfile(format!("noise distribution error: {e}")))?;
        for y in &mut self.ys {
            *y += normal.sample(&mut rng);
        }
        Ok(self)
    }

    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    pub fn range(&self) -> (f64, f64) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }
}

impl ScalarFunction for SampledProfile {
    fn value(&self, x: f64) -> f64 {
        let (lo, hi) = self.range();
        if !(x >= lo && x <= hi) {
            return 0.0;
        }
        let i = self.xs.partition_point(|&xi| xi <= x).clamp(1, self.xs.len() - 1);
        let (x0, x1) = (self.xs[i - 1], self.xs[i]);
        let (y0, y1) = (self.ys[i - 1], self.ys[i]);
        let u = (x - x0) / (x1 - x0);
        y0 + u * (y1 - y0)
    }
}

/// Either kind of profile, as produced by the pipeline.
#[derive(Debug, Clone)]
pub enum Profile {
    Synthetic(SyntheticProfile),
    Sampled(SampledProfile),
}

impl Profile {
    /// Build the synthetic profile of `spec`, tabulated (and perturbed) when
    /// `sampling` is given.
    pub fn from_spec(spec: &ProfileSpec, sampling: Option<&SamplingSpec>) -> Result<Self, GhError> {
        let synthetic = SyntheticProfile::new(spec.clone())?;
        match sampling {
            None => Ok(Profile::Synthetic(synthetic)),
            Some(sampling) => {
                let (lo, hi) = synthetic.range();
                let sampled = SampledProfile::tabulate(&synthetic, lo, hi, sampling.samples)?
                    .with_noise(sampling.noise, sampling.seed)?;
                Ok(Profile::Sampled(sampled))
            }
        }
    }

    pub fn range(&self) -> (f64, f64) {
        match self {
            Profile::Synthetic(p) => p.range(),
            Profile::Sampled(p) => p.range(),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Profile::Synthetic(p) => match p.spec().kind {
                ProfileKind::Gaussian => "gaussian".to_string(),
                ProfileKind::GaussHermite => "gauss-hermite".to_string(),
                ProfileKind::DoubleGaussian => "double-gaussian".to_string(),
            },
            Profile::Sampled(p) => format!("tabulated ({} samples)", p.xs().len()),
        }
    }
}

impl ScalarFunction for Profile {
    fn value(&self, x: f64) -> f64 {
        match self {
            Profile::Synthetic(p) => p.value(x),
            Profile::Sampled(p) => p.value(x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SamplingSpec;

    #[test]
    fn synthetic_profiles_integrate_to_their_analytic_integral() {
        for kind in [
            ProfileKind::Gaussian,
            ProfileKind::GaussHermite,
            ProfileKind::DoubleGaussian,
        ] {
            let p = SyntheticProfile::new(ProfileSpec {
                kind,
                amplitude: 2.0,
                center: 0.5,
                h3: 0.05,
                h4: 0.08,
                ..ProfileSpec::default()
            })
            .unwrap();
            let (lo, hi) = p.range();
            let n = 20_000;
            let dx = (hi - lo) / n as f64;
            let trapz: f64 = (0..=n)
                .map(|i| {
                    let w = if i == 0 || i == n { 0.5 } else { 1.0 };
                    w * p.value(lo + dx * i as f64)
                })
                .sum::<f64>()
                * dx;
            assert!(
                (trapz - p.integral()).abs() < 1e-6,
                "{kind:?}: {trapz} vs {}",
                p.integral()
            );
        }
    }

    #[test]
    fn invalid_profiles_are_rejected() {
        let bad_width = ProfileSpec {
            width: 0.0,
            ..ProfileSpec::default()
        };
        assert!(matches!(
            SyntheticProfile::new(bad_width),
            Err(GhError::InvalidProfile(_))
        ));
        let bad_mix = ProfileSpec {
            kind: ProfileKind::DoubleGaussian,
            mix_fraction: 1.5,
            ..ProfileSpec::default()
        };
        assert!(SyntheticProfile::new(bad_mix).is_err());
    }

    #[test]
    fn sampled_profile_interpolates_linearly() {
        let p = SampledProfile::new(vec![0.0, 1.0, 3.0], vec![0.0, 2.0, 1.0]).unwrap();
        assert_eq!(p.value(0.5), 1.0);
        assert_eq!(p.value(2.0), 1.5);
        assert_eq!(p.value(3.0), 1.0);
        assert_eq!(p.value(-0.1), 0.0);
        assert_eq!(p.value(3.1), 0.0);
        assert_eq!(p.value(f64::NAN), 0.0);
    }

    #[test]
    fn sampled_profile_validates_input() {
        assert!(SampledProfile::new(vec![0.0, 1.0], vec![1.0]).is_err());
        assert!(SampledProfile::new(vec![0.0], vec![1.0]).is_err());
        assert!(SampledProfile::new(vec![1.0, 0.0], vec![1.0, 1.0]).is_err());
        assert!(SampledProfile::new(vec![0.0, 1.0], vec![1.0, f64::NAN]).is_err());
    }

    #[test]
    fn noise_is_reproducible_for_a_seed() {
        let spec = ProfileSpec::default();
        let sampling = SamplingSpec {
            samples: 101,
            noise: 0.02,
            seed: 7,
        };
        let a = Profile::from_spec(&spec, Some(&sampling)).unwrap();
        let b = Profile::from_spec(&spec, Some(&sampling)).unwrap();
        let (Profile::Sampled(a), Profile::Sampled(b)) = (a, b) else {
            panic!("expected sampled profiles");
        };
        assert_eq!(a, b);

        let clean = SampledProfile::tabulate(
            &SyntheticProfile::new(spec).unwrap(),
            a.range().0,
            a.range().1,
            101,
        )
        .unwrap();
        assert_ne!(a.ys(), clean.ys());
    }
}
