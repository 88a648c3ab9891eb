//! Levenberg-Marquardt nonlinear least squares.
//!
//! Minimizes `½ Σ r_k(p)²` for a model that supplies residuals and their
//! analytic Jacobian. Each trial step solves the damped linear problem with
//! Marquardt scaling (`D = diag(JᵀJ)`) through [`solve_least_squares`]. A step
//! is kept only if it lowers the cost; otherwise the damping grows tenfold.
//!
//! The solver never fails: when the evaluation budget runs out it returns the
//! best iterate together with `converged = false`.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::math::solve_least_squares;

/// A residual vector `r(p)` with an optional Jacobian `∂r_k/∂p_i`.
pub trait ResidualModel {
    fn num_params(&self) -> usize;
    fn num_values(&self) -> usize;

    /// Fill `residuals` (length `num_values`) and, when requested, the
    /// `num_values × num_params` Jacobian.
    fn eval(&self, params: &[f64], residuals: &mut [f64], jacobian: Option<&mut DMatrix<f64>>);
}

/// Stopping rules for [`levenberg_marquardt`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LmConfig {
    /// Relative step / cost-reduction threshold for convergence.
    pub tolerance: f64,
    /// Maximum number of model evaluations.
    pub max_evaluations: usize,
}

impl Default for LmConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_evaluations: 100,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LmOutcome {
    pub params: Vec<f64>,
    /// `½ Σ r²` at `params`.
    pub cost: f64,
    /// Accepted steps.
    pub iterations: usize,
    pub evaluations: usize,
    pub converged: bool,
}

const LAMBDA_INIT: f64 = 1e-3;
const LAMBDA_MIN: f64 = 1e-12;
const LAMBDA_MAX: f64 = 1e16;

pub fn levenberg_marquardt<M: ResidualModel + ?Sized>(
    model: &M,
    init: &[f64],
    config: &LmConfig,
) -> LmOutcome {
    let np = model.num_params();
    let nv = model.num_values();
    let tol = config.tolerance;

    let mut params = init.to_vec();
    let mut resid = vec![0.0; nv];
    let mut jac = DMatrix::<f64>::zeros(nv, np);
    model.eval(&params, &mut resid, Some(&mut jac));
    let mut evaluations = 1;
    let mut cost = half_sum_sq(&resid);

    let mut trial_resid = vec![0.0; nv];
    let mut trial_jac = DMatrix::<f64>::zeros(nv, np);
    let mut lambda = LAMBDA_INIT;
    let mut iterations = 0;
    let mut converged = cost == 0.0;

    if !cost.is_finite() {
        log::warn!("Levenberg-Marquardt: non-finite cost at the initial guess {params:?}");
        return LmOutcome {
            params,
            cost,
            iterations,
            evaluations,
            converged: false,
        };
    }

    while !converged && evaluations < config.max_evaluations {
        let Some(delta) = damped_step(&jac, &resid, lambda) else {
            lambda *= 10.0;
            if lambda > LAMBDA_MAX {
                break;
            }
            continue;
        };

        let step_norm = delta.norm();
        let param_norm = params.iter().map(|p| p * p).sum::<f64>().sqrt();
        let trial: Vec<f64> = params.iter().zip(delta.iter()).map(|(p, d)| p + d).collect();

        model.eval(&trial, &mut trial_resid, Some(&mut trial_jac));
        evaluations += 1;
        let trial_cost = half_sum_sq(&trial_resid);

        if trial_cost.is_finite() && trial_cost < cost {
            let reduction = cost - trial_cost;
            params = trial;
            std::mem::swap(&mut resid, &mut trial_resid);
            std::mem::swap(&mut jac, &mut trial_jac);
            cost = trial_cost;
            iterations += 1;
            lambda = (lambda / 10.0).max(LAMBDA_MIN);

            if cost == 0.0 || step_norm <= tol * (param_norm + tol) || reduction <= tol * cost {
                converged = true;
            }
        } else {
            if step_norm <= tol * (param_norm + tol) {
                // Even tiny steps cannot improve the cost: we sit at the minimum.
                converged = true;
                break;
            }
            lambda *= 10.0;
            if lambda > LAMBDA_MAX {
                break;
            }
        }
    }

    if converged {
        log::debug!(
            "Levenberg-Marquardt converged: cost={cost:e}, iterations={iterations}, evaluations={evaluations}"
        );
    } else {
        log::warn!(
            "Levenberg-Marquardt stopped without convergence: cost={cost:e}, evaluations={evaluations}"
        );
    }

    LmOutcome {
        params,
        cost,
        iterations,
        evaluations,
        converged,
    }
}

fn half_sum_sq(r: &[f64]) -> f64 {
    0.5 * r.iter().map(|v| v * v).sum::<f64>()
}

/// Solve `min ‖J δ + r‖² + λ ‖D δ‖²` with `D² = diag(JᵀJ)`.
fn damped_step(jac: &DMatrix<f64>, resid: &[f64], lambda: f64) -> Option<DVector<f64>> {
    let (nv, np) = jac.shape();
    let mut a = DMatrix::<f64>::zeros(nv + np, np);
    let mut b = DVector::<f64>::zeros(nv + np);

    a.rows_mut(0, nv).copy_from(jac);
    for k in 0..nv {
        b[k] = -resid[k];
    }
    let max_diag = (0..np)
        .map(|i| jac.column(i).norm_squared())
        .fold(0.0_f64, f64::max)
        .max(f64::MIN_POSITIVE);
    for i in 0..np {
        let d2 = jac.column(i).norm_squared().max(1e-12 * max_diag);
        a[(nv + i, i)] = (lambda * d2).sqrt();
    }

    solve_least_squares(&a, &b)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `y = a · exp(−b t)` sampled on a fixed grid.
    struct ExpDecay {
        t: Vec<f64>,
        y: Vec<f64>,
    }

    impl ResidualModel for ExpDecay {
        fn num_params(&self) -> usize {
            2
        }

        fn num_values(&self) -> usize {
            self.t.len()
        }

        fn eval(&self, p: &[f64], residuals: &mut [f64], jacobian: Option<&mut DMatrix<f64>>) {
            let (a, b) = (p[0], p[1]);
            for (k, (&t, &y)) in self.t.iter().zip(self.y.iter()).enumerate() {
                residuals[k] = a * (-b * t).exp() - y;
            }
            if let Some(jac) = jacobian {
                for (k, &t) in self.t.iter().enumerate() {
                    let e = (-b * t).exp();
                    jac[(k, 0)] = e;
                    jac[(k, 1)] = -a * t * e;
                }
            }
        }
    }

    #[test]
    fn recovers_exponential_decay_parameters() {
        let t: Vec<f64> = (0..30).map(|i| i as f64 * 0.2).collect();
        let y = t.iter().map(|&t| 2.5 * (-0.7 * t).exp()).collect();
        let model = ExpDecay { t, y };

        let out = levenberg_marquardt(&model, &[1.0, 0.1], &LmConfig::default());
        assert!(out.converged, "{out:?}");
        assert!((out.params[0] - 2.5).abs() < 1e-5, "{out:?}");
        assert!((out.params[1] - 0.7).abs() < 1e-5, "{out:?}");
        assert!(out.evaluations <= 100);
    }

    #[test]
    fn exact_initial_guess_converges_immediately() {
        let t: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let y = t.iter().map(|&t| 3.0 * (-0.2 * t).exp()).collect();
        let model = ExpDecay { t, y };

        let out = levenberg_marquardt(&model, &[3.0, 0.2], &LmConfig::default());
        assert!(out.converged);
        assert_eq!(out.evaluations, 1);
        assert_eq!(out.params, vec![3.0, 0.2]);
    }

    #[test]
    fn stops_at_evaluation_budget() {
        let t: Vec<f64> = (0..20).map(|i| i as f64 * 0.5).collect();
        let y = t.iter().map(|&t| 4.0 * (-1.3 * t).exp()).collect();
        let model = ExpDecay { t, y };

        let config = LmConfig {
            tolerance: 1e-15,
            max_evaluations: 3,
        };
        let out = levenberg_marquardt(&model, &[0.5, 0.05], &config);
        assert!(out.evaluations <= 3);
        assert!(out.cost.is_finite());
    }
}
