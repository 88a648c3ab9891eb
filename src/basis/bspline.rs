//! Clamped B-spline basis over a breakpoint grid.
//!
//! For a grid of `G` breakpoints and degree `N` the knot vector repeats each
//! end point `N + 1` times, giving `G + N − 1` basis functions. At any point
//! inside the grid exactly `N + 1` consecutive functions may be non-zero; the
//! local evaluation below returns them together with the index of the first.
//!
//! Evaluation follows the Cox-de Boor recursion in the form of Algorithm A2.2
//! of Piegl & Tiller ("The NURBS Book").

use crate::basis::{MAX_SPLINE_DEGREE, PiecewiseBasis};
use crate::error::GhError;

#[derive(Debug, Clone)]
pub struct BsplineBasis<const N: usize> {
    grid: Vec<f64>,
    knots: Vec<f64>,
}

impl<const N: usize> BsplineBasis<N> {
    /// Build the basis over `grid`, which must hold at least two finite,
    /// strictly increasing breakpoints.
    pub fn new(grid: &[f64]) -> Result<Self, GhError> {
        if N > MAX_SPLINE_DEGREE {
            return Err(GhError::UnsupportedDegree(N));
        }
        validate_grid(grid)?;

        let mut knots = Vec::with_capacity(grid.len() + 2 * N);
        knots.extend(std::iter::repeat_n(grid[0], N));
        knots.extend_from_slice(grid);
        knots.extend(std::iter::repeat_n(grid[grid.len() - 1], N));

        Ok(Self {
            grid: grid.to_vec(),
            knots,
        })
    }

    /// Greville abscissae: the natural "location" of each basis function.
    pub fn greville(&self) -> Vec<f64> {
        (0..self.num_functions())
            .map(|j| {
                if N == 0 {
                    0.5 * (self.knots[j] + self.knots[j + 1])
                } else {
                    self.knots[j + 1..=j + N].iter().sum::<f64>() / N as f64
                }
            })
            .collect()
    }

    /// Index `s` of the grid segment `[grid[s], grid[s+1]]` containing `x`
    /// (the last segment is closed on the right).
    fn segment(&self, x: f64) -> usize {
        let last = self.grid.len() - 2;
        match self.grid.binary_search_by(|g| g.total_cmp(&x)) {
            Ok(i) => i.min(last),
            Err(i) => i.saturating_sub(1).min(last),
        }
    }
}

impl<const N: usize> PiecewiseBasis for BsplineBasis<N> {
    fn degree(&self) -> usize {
        N
    }

    fn breakpoints(&self) -> &[f64] {
        &self.grid
    }

    fn num_functions(&self) -> usize {
        self.grid.len() + N - 1
    }

    fn nonzero_components(&self, x: f64, values: &mut [f64]) -> usize {
        let values = &mut values[..=N];
        let (lo, hi) = (self.grid[0], self.grid[self.grid.len() - 1]);
        if !(x >= lo && x <= hi) {
            values.fill(0.0);
            return 0;
        }

        let s = self.segment(x);
        let mu = s + N;
        let knots = &self.knots;
        let mut left = [0.0; MAX_SPLINE_DEGREE + 1];
        let mut right = [0.0; MAX_SPLINE_DEGREE + 1];

        values[0] = 1.0;
        for d in 1..=N {
            left[d] = x - knots[mu + 1 - d];
            right[d] = knots[mu + d] - x;
            let mut saved = 0.0;
            for r in 0..d {
                let den = right[r + 1] + left[d - r];
                let temp = if den.abs() > 0.0 { values[r] / den } else { 0.0 };
                values[r] = saved + right[r + 1] * temp;
                saved = left[d - r] * temp;
            }
            values[d] = saved;
        }
        s
    }
}

pub(crate) fn validate_grid(grid: &[f64]) -> Result<(), GhError> {
    if grid.len() < 2 {
        return Err(GhError::InvalidGrid(format!(
            "need at least 2 breakpoints, got {}",
            grid.len()
        )));
    }
    if grid.iter().any(|g| !g.is_finite()) {
        return Err(GhError::InvalidGrid("breakpoints must be finite".to_string()));
    }
    if grid.windows(2).any(|w| w[1] <= w[0]) {
        return Err(GhError::InvalidGrid(
            "breakpoints must be strictly increasing".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn uniform_grid(lo: f64, hi: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| lo + (hi - lo) * i as f64 / (n - 1) as f64)
            .collect()
    }

    fn check_partition_of_unity<const N: usize>() {
        let basis = BsplineBasis::<N>::new(&[0.0, 0.3, 1.0, 1.5, 2.75, 4.0]).unwrap();
        let mut vals = [0.0; MAX_SPLINE_DEGREE + 1];
        for i in 0..=400 {
            let x = 4.0 * i as f64 / 400.0;
            let start = basis.nonzero_components(x, &mut vals);
            assert!(start + N < basis.num_functions());
            let sum: f64 = vals[..=N].iter().sum();
            assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-13);
            assert!(vals[..=N].iter().all(|&v| v >= -1e-15));
        }
    }

    #[test]
    fn partition_of_unity_for_all_degrees() {
        check_partition_of_unity::<0>();
        check_partition_of_unity::<1>();
        check_partition_of_unity::<2>();
        check_partition_of_unity::<3>();
    }

    #[test]
    fn function_count_is_grid_plus_degree_minus_one() {
        let grid = uniform_grid(-1.0, 1.0, 11);
        assert_eq!(BsplineBasis::<0>::new(&grid).unwrap().num_functions(), 10);
        assert_eq!(BsplineBasis::<1>::new(&grid).unwrap().num_functions(), 11);
        assert_eq!(BsplineBasis::<3>::new(&grid).unwrap().num_functions(), 13);
    }

    #[test]
    fn linear_basis_is_hat_functions() {
        let basis = BsplineBasis::<1>::new(&[0.0, 1.0, 2.0]).unwrap();
        let mut vals = [0.0; 2];
        let start = basis.nonzero_components(1.25, &mut vals);
        assert_eq!(start, 1);
        assert_abs_diff_eq!(vals[0], 0.75, epsilon = 1e-15);
        assert_abs_diff_eq!(vals[1], 0.25, epsilon = 1e-15);

        // right end belongs to the last segment
        let start = basis.nonzero_components(2.0, &mut vals);
        assert_eq!(start, 1);
        assert_abs_diff_eq!(vals[1], 1.0, epsilon = 1e-15);
    }

    #[test]
    fn outside_the_grid_everything_vanishes() {
        let basis = BsplineBasis::<2>::new(&uniform_grid(0.0, 1.0, 5)).unwrap();
        let mut vals = [9.0; 3];
        basis.nonzero_components(-0.1, &mut vals);
        assert_eq!(vals, [0.0; 3]);
        basis.nonzero_components(f64::NAN, &mut vals);
        assert_eq!(vals, [0.0; 3]);
        assert_eq!(basis.evaluate(1.5, &[1.0; 6]), 0.0);
    }

    #[test]
    fn cubic_basis_reproduces_linear_functions_at_greville_points() {
        // Σ ξ_j B_j(x) = x for degree ≥ 1
        let basis = BsplineBasis::<3>::new(&uniform_grid(-2.0, 3.0, 8)).unwrap();
        let coefs = basis.greville();
        for i in 0..=50 {
            let x = -2.0 + 5.0 * i as f64 / 50.0;
            assert_abs_diff_eq!(basis.evaluate(x, &coefs), x, epsilon = 1e-12);
        }
    }

    #[test]
    fn rejects_bad_grids() {
        assert!(matches!(
            BsplineBasis::<1>::new(&[1.0]),
            Err(GhError::InvalidGrid(_))
        ));
        assert!(matches!(
            BsplineBasis::<1>::new(&[0.0, 1.0, 1.0]),
            Err(GhError::InvalidGrid(_))
        ));
        assert!(matches!(
            BsplineBasis::<1>::new(&[0.0, f64::INFINITY]),
            Err(GhError::InvalidGrid(_))
        ));
        assert!(matches!(
            BsplineBasis::<4>::new(&[0.0, 1.0]),
            Err(GhError::UnsupportedDegree(4))
        ));
    }
}
