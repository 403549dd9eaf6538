//! Line search methods
//!
//! Every search starts from a base point `xp` with value `fp` and gradient
//! `gp`, moves along a descent direction `d`, and writes the accepted trial
//! point `x = xp + step * d` together with its gradient into caller-owned
//! buffers. The objective is reached through a closure
//! `eval(x, g, step) -> f` that fills `g` and returns `f(x)`.

pub mod backtracking;
pub mod more_thuente;

use num_traits::Float;
use std::fmt::Debug;

use crate::params::Parameters;
use crate::status::LineSearchError;
use crate::vector::{axpy, dot};

pub use backtracking::backtracking_owlqn;

/// Line search algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineSearchAlgorithm {
    /// More–Thuente search: safeguarded cubic/quadratic interpolation that
    /// brackets a step satisfying the sufficient decrease condition and the
    /// strong curvature condition `|g(x + a d)·d| <= gtol * |g(x)·d|`.
    #[default]
    MoreThuente,
    /// Backtracking until the sufficient decrease (Armijo) condition
    /// `f(x + a d) <= f(x) + ftol * a * g(x)·d` holds.
    BacktrackingArmijo,
    /// Backtracking until the Armijo condition and the regular Wolfe
    /// condition `g(x + a d)·d >= wolfe * g(x)·d` hold.
    BacktrackingWolfe,
    /// Backtracking until the Armijo condition and the strong Wolfe
    /// condition `|g(x + a d)·d| <= wolfe * |g(x)·d|` hold.
    BacktrackingStrongWolfe,
}

impl LineSearchAlgorithm {
    /// Alias used by liblbfgs for its default backtracking variant.
    pub const BACKTRACKING: LineSearchAlgorithm = LineSearchAlgorithm::BacktrackingStrongWolfe;

    /// Runs this search from `origin`.
    ///
    /// # Arguments
    ///
    /// * `origin` - Base point, its value and gradient, and the search direction
    /// * `x` - Receives the accepted point
    /// * `g` - Receives the gradient at the accepted point
    /// * `step` - Initial step estimate
    /// * `params` - Step bounds, tolerances, and the trial cap
    /// * `eval` - Objective and gradient evaluator
    ///
    /// # Returns
    ///
    /// The accepted step, its objective value, and the number of trial
    /// evaluations, or the reason the search failed. A direction that does
    /// not decrease the objective is rejected before any evaluation.
    ///
    /// # Examples
    ///
    /// ```
    /// use lbfgs::line_search::{LineSearchAlgorithm, Origin};
    /// use lbfgs::Parameters;
    ///
    /// // f(x) = x^2 from x = 1 along d = -1
    /// let origin = Origin { x: &[1.0], f: 1.0, g: &[2.0], d: &[-1.0] };
    /// let mut x = [0.0];
    /// let mut g = [0.0];
    /// let mut eval = |x: &[f64], g: &mut [f64], _step: f64| {
    ///     g[0] = 2.0 * x[0];
    ///     x[0] * x[0]
    /// };
    ///
    /// let accepted = LineSearchAlgorithm::MoreThuente
    ///     .search(&origin, &mut x, &mut g, 0.5, &Parameters::default(), &mut eval)
    ///     .unwrap();
    /// assert!(accepted.f < 1.0);
    /// ```
    pub fn search<T, E>(
        &self,
        origin: &Origin<'_, T>,
        x: &mut [T],
        g: &mut [T],
        step: T,
        params: &Parameters<T>,
        eval: &mut E,
    ) -> Result<Accepted<T>, LineSearchError>
    where
        T: Float + Debug,
        E: FnMut(&[T], &mut [T], T) -> T,
    {
        match self {
            LineSearchAlgorithm::MoreThuente => {
                more_thuente::more_thuente(origin, x, g, step, params, eval)
            }
            LineSearchAlgorithm::BacktrackingArmijo
            | LineSearchAlgorithm::BacktrackingWolfe
            | LineSearchAlgorithm::BacktrackingStrongWolfe => {
                backtracking::backtracking(*self, origin, x, g, step, params, eval)
            }
        }
    }
}

/// Base point of a line search.
#[derive(Debug, Clone, Copy)]
pub struct Origin<'a, T> {
    /// Starting point `xp`.
    pub x: &'a [T],
    /// Objective value at `xp`.
    pub f: T,
    /// Gradient at `xp` (the pseudo-gradient under OWL-QN).
    pub g: &'a [T],
    /// Search direction.
    pub d: &'a [T],
}

/// A step accepted by a line search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Accepted<T> {
    pub step: T,
    /// Objective value at the accepted point.
    pub f: T,
    /// Number of trial evaluations.
    pub trials: usize,
}

/// Checks the common preconditions and returns the initial directional
/// derivative together with the initial step clamped into the step bounds.
pub(crate) fn prepare<T: Float + Debug>(
    origin: &Origin<'_, T>,
    step: T,
    params: &Parameters<T>,
) -> Result<(T, T), LineSearchError> {
    if !(step > T::zero()) {
        return Err(LineSearchError::InvalidParameters);
    }
    let dginit = dot(origin.g, origin.d);
    if !(dginit < T::zero()) {
        return Err(LineSearchError::IncreaseGradient);
    }
    Ok((dginit, step.max(params.min_step).min(params.max_step)))
}

/// `x = xp + step * d`
#[inline]
pub(crate) fn take_step<T: Float>(x: &mut [T], origin: &Origin<'_, T>, step: T) {
    axpy(x, step, origin.d, origin.x);
}


#[cfg(test)]
mod tests {
    use super::test_support::ShiftedSphere;
    use super::*;

    const ALL: [LineSearchAlgorithm; 4] = [
        LineSearchAlgorithm::MoreThuente,
        LineSearchAlgorithm::BacktrackingArmijo,
        LineSearchAlgorithm::BacktrackingWolfe,
        LineSearchAlgorithm::BacktrackingStrongWolfe,
    ];

    #[test]
    fn test_default_is_more_thuente() {
        assert_eq!(
            LineSearchAlgorithm::default(),
            LineSearchAlgorithm::MoreThuente
        );
        assert_eq!(
            LineSearchAlgorithm::BACKTRACKING,
            LineSearchAlgorithm::BacktrackingStrongWolfe
        );
    }

    #[test]
    fn test_non_descent_direction_fails_without_evaluating() {
        let xp = [0.0, 0.0];
        let gp = [-2.0, -2.0];
        // Uphill: d points along the gradient.
        let d = [-1.0, -1.0];
        let origin = Origin { x: &xp, f: 2.0, g: &gp, d: &d };
        for algorithm in ALL {
            let mut sphere = ShiftedSphere::new();
            let mut x = [0.0; 2];
            let mut g = [0.0; 2];
            let result = algorithm.search(
                &origin,
                &mut x,
                &mut g,
                1.0,
                &Parameters::default(),
                &mut |x: &[f64], g: &mut [f64], s| sphere.eval(x, g, s),
            );
            assert_eq!(result, Err(LineSearchError::IncreaseGradient));
            assert_eq!(sphere.calls, 0, "{algorithm:?} evaluated the objective");
        }
    }

    #[test]
    fn test_non_positive_step_is_rejected() {
        let origin = Origin { x: &[0.0], f: 1.0, g: &[-2.0], d: &[1.0] };
        for algorithm in ALL {
            let mut sphere = ShiftedSphere::new();
            let mut x = [0.0];
            let mut g = [0.0];
            let result = algorithm.search(
                &origin,
                &mut x,
                &mut g,
                0.0,
                &Parameters::default(),
                &mut |x: &[f64], g: &mut [f64], s| sphere.eval(x, g, s),
            );
            assert_eq!(result, Err(LineSearchError::InvalidParameters));
            assert_eq!(sphere.calls, 0);
        }
    }

    #[test]
    fn test_accepted_steps_respect_bounds_and_decrease() {
        let xp = [0.0, 0.0];
        let gp = [-2.0, -2.0];
        let d = [1.0, 1.0];
        let origin = Origin { x: &xp, f: 2.0, g: &gp, d: &d };
        let params = Parameters::default().with_step_bounds(1e-3, 0.75);
        for algorithm in ALL {
            for &initial in &[1e-6, 0.1, 1.0, 100.0] {
                let mut sphere = ShiftedSphere::new();
                let mut x = [0.0; 2];
                let mut g = [0.0; 2];
                let accepted = algorithm
                    .search(
                        &origin,
                        &mut x,
                        &mut g,
                        initial,
                        &params,
                        &mut |x: &[f64], g: &mut [f64], s| sphere.eval(x, g, s),
                    )
                    .unwrap();
                assert!(accepted.step >= params.min_step, "{algorithm:?}");
                assert!(accepted.step <= params.max_step, "{algorithm:?}");
                assert!(accepted.f < origin.f, "{algorithm:?}");
                assert_eq!(accepted.trials, sphere.calls);
                assert!(accepted.trials <= params.max_linesearch);
                assert_eq!(x, [accepted.step, accepted.step]);
            }
        }
    }

    #[test]
    fn test_no_acceptable_step_is_an_error() {
        // Every t > 0 is worse than the origin, so each search has to give
        // up within the trial cap without returning a step.
        let origin = Origin { x: &[0.0], f: 1.0, g: &[-2.0], d: &[1.0] };
        for gtol in [0.9, 1.0] {
            let params = Parameters {
                gtol,
                ..Parameters::default()
                    .with_step_bounds(1e-3, 0.75)
                    .with_max_linesearch(3)
            };
            for algorithm in ALL {
                for &initial in &[1e-6, 0.1, 1.0, 100.0] {
                    let mut calls = 0;
                    let mut x = [0.0];
                    let mut g = [0.0];
                    let result = algorithm.search(
                        &origin,
                        &mut x,
                        &mut g,
                        initial,
                        &params,
                        &mut |x: &[f64], g: &mut [f64], _| {
                            calls += 1;
                            if x[0] <= 0.0 {
                                g[0] = 2.0 * (x[0] - 1.0);
                                (x[0] - 1.0) * (x[0] - 1.0)
                            } else {
                                g[0] = 1.0;
                                10.0 + x[0]
                            }
                        },
                    );
                    assert!(
                        result.is_err(),
                        "{algorithm:?}, gtol = {gtol}, initial = {initial}: {result:?}"
                    );
                    assert!(calls <= params.max_linesearch);
                }
            }
        }
    }
}
