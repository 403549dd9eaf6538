use log::trace;
use num_traits::Float;
use std::fmt::Debug;

use super::{prepare, take_step, Accepted, LineSearchAlgorithm, Origin};
use crate::orthantwise::Orthantwise;
use crate::params::Parameters;
use crate::status::LineSearchError;
use crate::vector::{dot, lit};

const DEC: f64 = 0.5;
const INC: f64 = 2.1;

/// Backtracking line search with the Armijo, Wolfe, or strong Wolfe test
/// selected by `algorithm`.
///
/// The step shrinks by `0.5` while the sufficient decrease condition fails
/// and grows by `2.1` while the curvature condition fails because the slope
/// is still too steep. The search fails when the next step would leave
/// `[min_step, max_step]` or when `max_linesearch` trials were spent.
pub fn backtracking<T, E>(
    algorithm: LineSearchAlgorithm,
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
    let (dginit, mut step) = prepare(origin, step, params)?;
    let finit = origin.f;
    let dgtest = params.ftol * dginit;
    let mut trials = 0;

    loop {
        take_step(x, origin, step);
        let f = eval(x, g, step);
        trials += 1;
        trace!("backtracking: trial = {}, step = {:?}, f = {:?}", trials, step, f);

        let width = if f > finit + step * dgtest {
            DEC
        } else if algorithm == LineSearchAlgorithm::BacktrackingArmijo {
            return Ok(Accepted { step, f, trials });
        } else {
            let dg = dot(g, origin.d);
            if dg < params.wolfe * dginit {
                INC
            } else if algorithm == LineSearchAlgorithm::BacktrackingWolfe {
                return Ok(Accepted { step, f, trials });
            } else if dg > -params.wolfe * dginit {
                DEC
            } else {
                return Ok(Accepted { step, f, trials });
            }
        };

        if trials >= params.max_linesearch {
            return Err(LineSearchError::MaximumLineSearch);
        }
        step = step * lit(width);
        if step < params.min_step {
            return Err(LineSearchError::MinimumStep);
        }
        if step > params.max_step {
            return Err(LineSearchError::MaximumStep);
        }
    }
}

/// Backtracking line search for OWL-QN.
///
/// Every trial point is projected onto the orthant `wp` of the base point, so
/// no penalized coordinate changes sign during the search. The penalty is
/// added to the objective and the sufficient decrease test uses the
/// pseudo-gradient `origin.g` along the projected displacement:
/// `f(x) <= f(xp) + ftol * (x - xp)·pg`.
pub fn backtracking_owlqn<T, E>(
    owl: &Orthantwise<T>,
    origin: &Origin<'_, T>,
    wp: &mut [T],
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
    let (_, mut step) = prepare(origin, step, params)?;
    let finit = origin.f;
    let mut trials = 0;

    owl.orthant(wp, origin.x, origin.g);

    loop {
        take_step(x, origin, step);
        owl.project(x, wp);

        let f = eval(x, g, step) + owl.penalty(x);
        trials += 1;

        let dgtest = x
            .iter()
            .zip(origin.x.iter())
            .zip(origin.g.iter())
            .fold(T::zero(), |acc, ((&x_i, &xp_i), &pg_i)| {
                acc + (x_i - xp_i) * pg_i
            });
        trace!("owlqn backtracking: trial = {}, step = {:?}, f = {:?}", trials, step, f);

        if f <= finit + params.ftol * dgtest {
            return Ok(Accepted { step, f, trials });
        }

        if trials >= params.max_linesearch {
            return Err(LineSearchError::MaximumLineSearch);
        }
        step = step * lit(DEC);
        if step < params.min_step {
            return Err(LineSearchError::MinimumStep);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::ShiftedSphere;
    use super::*;
    use approx::assert_relative_eq;

    fn search(
        algorithm: LineSearchAlgorithm,
        step: f64,
        params: &Parameters<f64>,
    ) -> (Result<Accepted<f64>, LineSearchError>, usize) {
        // phi(t) = 2 (t - 1)^2 along d = (1, 1) from the origin.
        let origin = Origin { x: &[0.0, 0.0], f: 2.0, g: &[-2.0, -2.0], d: &[1.0, 1.0] };
        let mut sphere = ShiftedSphere::new();
        let mut x = [0.0; 2];
        let mut g = [0.0; 2];
        let result = backtracking(
            algorithm,
            &origin,
            &mut x,
            &mut g,
            step,
            params,
            &mut |x: &[f64], g: &mut [f64], s| sphere.eval(x, g, s),
        );
        (result, sphere.calls)
    }

    #[test]
    fn test_armijo_accepts_full_step() {
        let (result, calls) = search(
            LineSearchAlgorithm::BacktrackingArmijo,
            1.0,
            &Parameters::default(),
        );
        let accepted = result.unwrap();
        assert_relative_eq!(accepted.step, 1.0);
        assert_relative_eq!(accepted.f, 0.0);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_armijo_shrinks_overlong_step() {
        // phi(4) = 18 > 2, phi(2) = 2 fails the strict decrease, phi(1) = 0.
        let (result, calls) = search(
            LineSearchAlgorithm::BacktrackingArmijo,
            4.0,
            &Parameters::default(),
        );
        let accepted = result.unwrap();
        assert_relative_eq!(accepted.step, 1.0);
        assert_eq!(accepted.trials, 3);
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_wolfe_grows_short_step() {
        let (result, _) = search(
            LineSearchAlgorithm::BacktrackingWolfe,
            1e-3,
            &Parameters::default(),
        );
        let accepted = result.unwrap();
        // Curvature: 4 (t - 1) >= 0.9 * -4 requires t >= 0.1.
        assert!(accepted.step >= 0.1);
        assert!(accepted.trials > 1);
    }

    #[test]
    fn test_strong_wolfe_rejects_overshoot() {
        // t = 1.95 satisfies Armijo (phi = 1.805 < 2) but the slope 3.8 is too steep.
        let (result, _) = search(
            LineSearchAlgorithm::BacktrackingStrongWolfe,
            1.95,
            &Parameters::default(),
        );
        let accepted = result.unwrap();
        assert!(accepted.step < 1.95);
        assert!((4.0 * (accepted.step - 1.0)).abs() <= 0.9 * 4.0);
    }

    #[test]
    fn test_trial_cap() {
        let params = Parameters::default().with_max_linesearch(2);
        let (result, calls) = search(LineSearchAlgorithm::BacktrackingArmijo, 64.0, &params);
        assert_eq!(result, Err(LineSearchError::MaximumLineSearch));
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_step_below_minimum() {
        let params = Parameters::default().with_step_bounds(10.0, 1e20);
        let (result, calls) = search(LineSearchAlgorithm::BacktrackingArmijo, 16.0, &params);
        assert_eq!(result, Err(LineSearchError::MinimumStep));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_step_above_maximum() {
        let params = Parameters::default().with_step_bounds(1e-20, 1e-2);
        let (result, _) = search(LineSearchAlgorithm::BacktrackingWolfe, 1e-3, &params);
        assert_eq!(result, Err(LineSearchError::MaximumStep));
    }

    #[test]
    fn test_owlqn_never_crosses_orthant() {
        // f(x) = x^2 + |x| from x = 1 along a direction overshooting zero.
        let owl = Orthantwise::new(1.0, 0, 1);
        let xp = [1.0];
        let pg = [3.0];
        let d = [-3.0];
        let origin = Origin { x: &xp, f: 2.0, g: &pg, d: &d };
        let mut wp = [0.0];
        let mut x = [0.0];
        let mut g = [0.0];
        let mut seen = Vec::new();
        let accepted = backtracking_owlqn(
            &owl,
            &origin,
            &mut wp,
            &mut x,
            &mut g,
            1.0,
            &Parameters::default(),
            &mut |x: &[f64], g: &mut [f64], _| {
                seen.push(x[0]);
                g[0] = 2.0 * x[0];
                x[0] * x[0]
            },
        )
        .unwrap();
        assert!(seen.iter().all(|&v| v >= 0.0));
        // The projected full step lands on zero, the exact minimizer.
        assert_eq!(x, [0.0]);
        assert_eq!(accepted.f, 0.0);
        assert_eq!(accepted.trials, 1);
    }
}
