//! Quadrature rules.
//!
//! - Gauss-Legendre nodes/weights on `[0, 1]`, cached per node count.
//! - A vector-valued adaptive Gauss-Kronrod (G7/K15) integrator with a hard
//!   evaluation budget. When the budget runs out the best estimate so far is
//!   returned (with `converged = false`) instead of looping on.

use std::sync::OnceLock;

/// Largest Gauss-Legendre rule kept in the table.
pub const MAX_GL_NODES: usize = 32;

/// Gauss-Legendre rule mapped to `[0, 1]` (weights sum to one).
#[derive(Debug, Clone)]
pub struct GaussLegendreRule {
    pub nodes: Vec<f64>,
    pub weights: Vec<f64>,
}

impl GaussLegendreRule {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

static GL_TABLE: OnceLock<Vec<GaussLegendreRule>> = OnceLock::new();

/// Gauss-Legendre rule with `n` nodes on `[0, 1]`.
///
/// `n` is clamped to `1..=MAX_GL_NODES`.
pub fn gauss_legendre(n: usize) -> &'static GaussLegendreRule {
    let table = GL_TABLE.get_or_init(|| (1..=MAX_GL_NODES).map(build_gauss_legendre).collect());
    &table[n.clamp(1, MAX_GL_NODES) - 1]
}

/// `P_n(x)` and `P'_n(x)` from the three-term recurrence.
fn legendre_and_derivative(n: usize, x: f64) -> (f64, f64) {
    let mut p0 = 1.0;
    let mut p1 = x;
    for k in 2..=n {
        let kf = k as f64;
        let p2 = ((2.0 * kf - 1.0) * x * p1 - (kf - 1.0) * p0) / kf;
        p0 = p1;
        p1 = p2;
    }
    if n == 0 {
        return (1.0, 0.0);
    }
    // P'_n = n (x P_n − P_{n−1}) / (x² − 1); nodes are strictly inside (−1, 1).
    let dp = n as f64 * (x * p1 - p0) / (x * x - 1.0);
    (p1, dp)
}

fn build_gauss_legendre(n: usize) -> GaussLegendreRule {
    let mut nodes = vec![0.0; n];
    let mut weights = vec![0.0; n];
    let m = n.div_ceil(2);
    for i in 0..m {
        // Chebyshev-like initial guess for the i-th largest root, then Newton.
        let mut z = (std::f64::consts::PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
        for _ in 0..100 {
            let (p, dp) = legendre_and_derivative(n, z);
            let dz = p / dp;
            z -= dz;
            if dz.abs() < 1e-15 {
                break;
            }
        }
        let (_, dp) = legendre_and_derivative(n, z);
        let w = 2.0 / ((1.0 - z * z) * dp * dp);
        // map [−1, 1] onto [0, 1]
        nodes[i] = 0.5 * (1.0 - z);
        nodes[n - 1 - i] = 0.5 * (1.0 + z);
        weights[i] = 0.5 * w;
        weights[n - 1 - i] = 0.5 * w;
    }
    GaussLegendreRule { nodes, weights }
}

/// Positive-half Kronrod nodes of the 15-point rule (index 0 is the midpoint).
const KRONROD_NODES: [f64; 8] = [
    0.0,
    0.207_784_955_007_898_467_600_689_403_773_245,
    0.405_845_151_377_397_166_906_606_412_076_961,
    0.586_087_235_467_691_130_294_144_838_258_730,
    0.741_531_185_599_394_439_863_864_773_280_788,
    0.864_864_423_359_769_072_789_712_788_640_926,
    0.949_107_912_342_758_524_526_189_684_047_851,
    0.991_455_371_120_812_639_206_854_697_526_329,
];

const KRONROD_WEIGHTS: [f64; 8] = [
    0.209_482_141_084_727_828_012_999_174_891_714,
    0.204_432_940_075_298_892_414_161_999_234_649,
    0.190_350_578_064_785_409_913_256_402_421_014,
    0.169_004_726_639_267_902_826_583_426_598_550,
    0.140_653_259_715_525_918_745_189_590_510_238,
    0.104_790_010_322_250_183_839_876_322_541_518,
    0.063_092_092_629_978_553_290_700_663_189_204,
    0.022_935_322_010_529_224_963_732_008_058_970,
];

/// Weights of the embedded 7-point Gauss rule; its nodes are the even Kronrod nodes.
const GAUSS_WEIGHTS: [f64; 4] = [
    0.417_959_183_673_469_387_755_102_040_816_327,
    0.381_830_050_505_118_944_950_369_775_488_975,
    0.279_705_391_489_276_667_901_467_771_423_780,
    0.129_484_966_168_869_693_270_611_432_679_082,
];

const GK_POINTS: usize = 15;

/// Number of equal pieces the interval is cut into before adapting.
const INITIAL_SEGMENTS: usize = 4;

/// Outcome of an adaptive integration.
#[derive(Debug, Clone)]
pub struct IntegrationResult {
    pub values: Vec<f64>,
    pub errors: Vec<f64>,
    pub evaluations: usize,
    pub converged: bool,
}

#[derive(Debug, Clone)]
struct Segment {
    a: f64,
    b: f64,
    values: Vec<f64>,
    errors: Vec<f64>,
}

impl Segment {
    fn error_norm(&self) -> f64 {
        self.errors.iter().map(|e| e * e).sum::<f64>().sqrt()
    }
}

fn gauss_kronrod_segment<F>(f: &F, a: f64, b: f64, num_values: usize, scratch: &mut [f64]) -> Segment
where
    F: Fn(f64, &mut [f64]),
{
    let half = 0.5 * (b - a);
    let mid = 0.5 * (a + b);
    let mut kronrod = vec![0.0; num_values];
    let mut gauss = vec![0.0; num_values];

    for (k, (&node, &wk)) in KRONROD_NODES.iter().zip(KRONROD_WEIGHTS.iter()).enumerate() {
        let wg = if k % 2 == 0 { GAUSS_WEIGHTS[k / 2] } else { 0.0 };
        let points: &[f64] = if k == 0 { &[0.0] } else { &[-1.0, 1.0] };
        for &sign in points {
            f(mid + sign * half * node, scratch);
            for v in 0..num_values {
                kronrod[v] += wk * scratch[v];
                gauss[v] += wg * scratch[v];
            }
        }
    }

    let errors = kronrod
        .iter()
        .zip(gauss.iter())
        .map(|(k, g)| (half * (k - g)).abs())
        .collect();
    let values = kronrod.iter().map(|k| half * k).collect();
    Segment { a, b, values, errors }
}

/// Integrate a vector-valued function over `[a, b]`.
///
/// `f(x, out)` writes `num_values` integrand components into `out`. Refinement
/// stops once the Euclidean norm of the error estimate falls below
/// `rel_tol` times the norm of the integral, or when another bisection would
/// exceed `max_evals` function calls.
pub fn integrate_adaptive<F>(
    f: F,
    num_values: usize,
    a: f64,
    b: f64,
    rel_tol: f64,
    max_evals: usize,
) -> IntegrationResult
where
    F: Fn(f64, &mut [f64]),
{
    let mut scratch = vec![0.0; num_values];
    let step = (b - a) / INITIAL_SEGMENTS as f64;
    let mut segments: Vec<Segment> = (0..INITIAL_SEGMENTS)
        .map(|i| {
            let lo = a + step * i as f64;
            let hi = if i + 1 == INITIAL_SEGMENTS { b } else { lo + step };
            gauss_kronrod_segment(&f, lo, hi, num_values, &mut scratch)
        })
        .collect();
    let mut evaluations = INITIAL_SEGMENTS * GK_POINTS;

    let converged = loop {
        let (total, error) = accumulate(&segments, num_values);
        let total_norm = total.iter().map(|v| v * v).sum::<f64>().sqrt();
        let error_norm = error.iter().map(|e| e * e).sum::<f64>().sqrt();
        if error_norm <= rel_tol * total_norm {
            break true;
        }
        if evaluations + 2 * GK_POINTS > max_evals {
            break false;
        }

        let worst = segments
            .iter()
            .enumerate()
            .max_by(|(_, s), (_, t)| {
                s.error_norm()
                    .partial_cmp(&t.error_norm())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(i, _)| i)
            .unwrap_or(0);
        let seg = segments.swap_remove(worst);
        let mid = 0.5 * (seg.a + seg.b);
        segments.push(gauss_kronrod_segment(&f, seg.a, mid, num_values, &mut scratch));
        segments.push(gauss_kronrod_segment(&f, mid, seg.b, num_values, &mut scratch));
        evaluations += 2 * GK_POINTS;
    };

    let (values, errors) = accumulate(&segments, num_values);
    if !converged {
        log::debug!(
            "adaptive quadrature stopped after {evaluations} evaluations without reaching rel_tol={rel_tol:e}"
        );
    }
    IntegrationResult {
        values,
        errors,
        evaluations,
        converged,
    }
}

fn accumulate(segments: &[Segment], num_values: usize) -> (Vec<f64>, Vec<f64>) {
    let mut total = vec![0.0; num_values];
    let mut error = vec![0.0; num_values];
    for s in segments {
        for v in 0..num_values {
            total[v] += s.values[v];
            error[v] += s.errors[v];
        }
    }
    (total, error)
}
