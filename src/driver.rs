use log::{debug, info, trace, warn};
use num_traits::Float;
use std::fmt::Debug;
use std::ops::ControlFlow;

use crate::evaluate::Evaluate;
use crate::history::History;
use crate::line_search::{backtracking_owlqn, Origin};
use crate::params::Parameters;
use crate::progress::{Progress, ProgressInfo};
use crate::status::{Report, Result, Status};
use crate::vector::{copy, norm2, norm2_inv};

/// Minimizes an objective with L-BFGS, or with OWL-QN when
/// `params.orthantwise_c > 0`.
///
/// # Arguments
///
/// * `x` - The starting point on input, the final point on output
/// * `evaluate` - Objective and gradient evaluator
/// * `ctx` - Caller context forwarded to `evaluate` and `progress`
/// * `params` - Configuration of the run
/// * `progress` - Called once per iteration; returning `ControlFlow::Break` cancels the run
///
/// # Returns
///
/// A [`Report`] with the termination status and the objective value at the
/// returned point. Invalid parameters are reported as an error before
/// `evaluate` is called. When the line search fails, `x` holds the last
/// accepted iterate.
///
/// # Examples
///
/// ```
/// use lbfgs::{minimize, Parameters, Silent};
///
/// let mut x = vec![1.0, -2.0, 3.0];
/// let report = minimize(
///     &mut x,
///     |_: &mut (), x: &[f64], g: &mut [f64], _step: f64| {
///         for (g_i, &x_i) in g.iter_mut().zip(x.iter()) {
///             *g_i = 2.0 * x_i;
///         }
///         x.iter().map(|x_i| x_i * x_i).sum()
///     },
///     &mut (),
///     &Parameters::default(),
///     Silent,
/// )
/// .unwrap();
///
/// assert!(report.status.is_success());
/// assert!(report.fx < 1e-10);
/// ```
pub fn minimize<T, C, E, P>(
    x: &mut [T],
    mut evaluate: E,
    ctx: &mut C,
    params: &Parameters<T>,
    mut progress: P,
) -> Result<Report<T>>
where
    T: Float + Debug,
    E: Evaluate<C, T>,
    P: Progress<C, T>,
{
    let n = x.len();
    params.validate(n)?;
    let owl = params.orthantwise(n);

    let mut g = vec![T::zero(); n];
    let mut xp = vec![T::zero(); n];
    let mut gp = vec![T::zero(); n];
    let mut pg = vec![T::zero(); n];
    let mut d = vec![T::zero(); n];
    let mut wp = vec![T::zero(); n];
    let mut pf = vec![T::zero(); params.past];
    let mut history = History::new(params.m, n);
    let mut evaluations = 0;

    let mut fx = evaluate.evaluate(ctx, x, &mut g, T::zero());
    evaluations += 1;
    if let Some(owl) = &owl {
        fx = fx + owl.penalty(x);
        owl.pseudo_gradient(&mut pg, x, &g);
    }
    if let Some(first) = pf.first_mut() {
        *first = fx;
    }

    let xnorm = norm2(x);
    let gnorm = norm2(if owl.is_some() { &pg } else { &g });
    if gradient_converged(params, owl.is_some(), xnorm, gnorm) {
        return Ok(finish(Status::AlreadyMinimized, fx, 0, evaluations));
    }

    // Steepest descent to start with, the history being empty.
    match &owl {
        Some(owl) => {
            history.two_loop(&pg, &mut d);
            owl.constrain_direction(&mut d, &pg);
        }
        None => history.two_loop(&g, &mut d),
    }
    let mut step = norm2_inv(&d);

    let mut k = 1;
    loop {
        copy(&mut xp, x);
        copy(&mut gp, &g);

        let origin = Origin {
            x: &xp,
            f: fx,
            g: if owl.is_some() { &pg } else { &gp },
            d: &d,
        };
        let mut eval = |x: &[T], g: &mut [T], step: T| {
            evaluations += 1;
            evaluate.evaluate(ctx, x, g, step)
        };
        let searched = match &owl {
            Some(owl) => {
                backtracking_owlqn(owl, &origin, &mut wp, x, &mut g, step, params, &mut eval)
            }
            None => params
                .linesearch
                .search(&origin, x, &mut g, step, params, &mut eval),
        };

        let accepted = match searched {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!("lbfgs: line search failed at iteration {}: {}", k, e);
                copy(x, &xp);
                copy(&mut g, &gp);
                return Ok(finish(Status::LineSearchFailed(e), fx, k - 1, evaluations));
            }
        };
        fx = accepted.f;
        step = accepted.step;
        if let Some(owl) = &owl {
            owl.pseudo_gradient(&mut pg, x, &g);
        }

        let xnorm = norm2(x);
        let gnorm = norm2(if owl.is_some() { &pg } else { &g });
        debug!(
            "lbfgs: k = {}, ls = {}, fx = {:?}, xnorm = {:?}, gnorm = {:?}, step = {:?}",
            k, accepted.trials, fx, xnorm, gnorm, step
        );

        if !history.update(x, &xp, &g, &gp) {
            trace!("lbfgs: skipped correction pair violating the curvature condition at k = {}", k);
        }

        let info = ProgressInfo {
            x,
            g: &g,
            fx,
            xnorm,
            gnorm,
            step,
            n,
            k,
            ls: accepted.trials,
        };
        if let ControlFlow::Break(()) = progress.progress(ctx, &info) {
            return Ok(finish(Status::Canceled, fx, k, evaluations));
        }

        if gradient_converged(params, owl.is_some(), xnorm, gnorm) {
            return Ok(finish(Status::Converged, fx, k, evaluations));
        }

        if params.past > 0 {
            let slot = k % params.past;
            if k >= params.past {
                let f_prev = pf[slot];
                let rate = (f_prev - fx) / f_prev.abs().max(T::one());
                if rate < params.delta {
                    return Ok(finish(Status::Stop, fx, k, evaluations));
                }
            }
            pf[slot] = fx;
        }

        if params.max_iterations != 0 && k >= params.max_iterations {
            return Ok(finish(Status::MaxIterationsReached, fx, k, evaluations));
        }

        match &owl {
            Some(owl) => {
                history.two_loop(&pg, &mut d);
                owl.constrain_direction(&mut d, &pg);
            }
            None => history.two_loop(&g, &mut d),
        }
        step = T::one();
        k += 1;
    }
}

/// Runs repeated minimizations with one parameter set.
///
/// Each call to [`Lbfgs::minimize`] allocates its own history and work
/// vectors, so runs never share state.
#[derive(Debug, Clone, PartialEq)]
pub struct Lbfgs<T> {
    params: Parameters<T>,
}

impl<T> Lbfgs<T>
where
    T: Float + Debug,
{
    pub fn new(params: Parameters<T>) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &Parameters<T> {
        &self.params
    }

    /// See [`minimize`].
    pub fn minimize<C, E, P>(
        &self,
        x: &mut [T],
        evaluate: E,
        ctx: &mut C,
        progress: P,
    ) -> Result<Report<T>>
    where
        E: Evaluate<C, T>,
        P: Progress<C, T>,
    {
        minimize(x, evaluate, ctx, &self.params, progress)
    }
}

impl<T> Default for Lbfgs<T>
where
    T: Float + Debug,
{
    fn default() -> Self {
        Self::new(Parameters::default())
    }
}

/// `||g|| / max(1, ||x||) <= epsilon`, or `||pg|| <= epsilon` under OWL-QN.
fn gradient_converged<T: Float + Debug>(
    params: &Parameters<T>,
    orthantwise: bool,
    xnorm: T,
    gnorm: T,
) -> bool {
    if orthantwise {
        gnorm <= params.epsilon
    } else {
        gnorm / xnorm.max(T::one()) <= params.epsilon
    }
}

fn finish<T: Float + Debug>(status: Status, fx: T, iterations: usize, evaluations: usize) -> Report<T> {
    info!(
        "lbfgs: {} after {} iterations and {} evaluations, fx = {:?}",
        status, iterations, evaluations, fx
    );
    Report {
        status,
        fx,
        iterations,
        evaluations,
    }
}
