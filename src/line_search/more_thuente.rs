//! More–Thuente line search.
//!
//! Reference: J. J. More and D. J. Thuente, "Line search algorithms with
//! guaranteed sufficient decrease", ACM TOMS 20 (1994), following the
//! MINPACK-2 `dcsrch`/`dcstep` structure.

use log::trace;
use num_traits::Float;
use std::fmt::Debug;

use super::{prepare, take_step, Accepted, Origin};
use crate::params::Parameters;
use crate::status::LineSearchError;
use crate::vector::{dot, lit};

/// Step, function value, and directional derivative at one end of the
/// interval of uncertainty.
#[derive(Debug, Clone, Copy)]
struct Endpoint<T> {
    t: T,
    f: T,
    d: T,
}

/// Searches for a step satisfying the sufficient decrease condition
/// `f(xp + t d) <= f(xp) + ftol * t * g(xp)·d` and the curvature condition
/// `|g(xp + t d)·d| <= gtol * |g(xp)·d|`.
///
/// The minimizer is bracketed in an interval of uncertainty that shrinks
/// with safeguarded cubic and quadratic interpolation; when an update fails
/// to shrink the interval by a third, the next trial bisects it instead.
pub fn more_thuente<T, E>(
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
    let (dginit, mut stp) = prepare(origin, step, params)?;
    let four: T = lit(4.0);
    let half: T = lit(0.5);
    let shrink: T = lit(0.66);

    let finit = origin.f;
    let dgtest = params.ftol * dginit;
    let mut brackt = false;
    let mut stage1 = true;
    let mut interval_ok = true;
    let mut width = params.max_step - params.min_step;
    let mut prev_width = width + width;

    // `bx` is the best step so far, `by` the other end of the interval.
    let mut bx = Endpoint { t: T::zero(), f: finit, d: dginit };
    let mut by = bx;
    let mut trials = 0;

    loop {
        let (stmin, stmax) = if brackt {
            (bx.t.min(by.t), bx.t.max(by.t))
        } else {
            (bx.t, stp + four * (stp - bx.t))
        };

        stp = stp.max(params.min_step).min(params.max_step);

        // On an unusual termination fall back to the best step so far. That
        // step lies on an end of the interval, so the trial below always
        // ends in `RoundingError` and is never accepted.
        let fallback = brackt
            && (stp <= stmin
                || stmax <= stp
                || params.max_linesearch <= trials + 1
                || !interval_ok
                || stmax - stmin <= params.xtol * stmax);
        if fallback {
            stp = bx.t;
        }

        take_step(x, origin, stp);
        let f = eval(x, g, stp);
        let dg = dot(g, origin.d);
        let ftest1 = finit + stp * dgtest;
        trials += 1;
        trace!(
            "more_thuente: trial = {}, stp = {:?}, f = {:?}, dg = {:?}, brackt = {}",
            trials, stp, f, dg, brackt
        );

        if !fallback && f <= ftest1 && dg.abs() <= params.gtol * (-dginit) {
            return Ok(Accepted { step: stp, f, trials });
        }
        if brackt && (stp <= stmin || stmax <= stp || !interval_ok) {
            return Err(LineSearchError::RoundingError);
        }
        if stp == params.max_step && f <= ftest1 && dg <= dgtest {
            return Err(LineSearchError::MaximumStep);
        }
        if stp == params.min_step && (ftest1 < f || dgtest <= dg) {
            return Err(LineSearchError::MinimumStep);
        }
        if brackt && stmax - stmin <= params.xtol * stmax {
            return Err(LineSearchError::WidthTooSmall);
        }
        if params.max_linesearch <= trials {
            return Err(LineSearchError::MaximumLineSearch);
        }

        // Stage one ends once a step gives sufficient decrease and a
        // derivative no steeper than min(ftol, gtol) * dginit.
        if stage1 && f <= ftest1 && params.ftol.min(params.gtol) * dginit <= dg {
            stage1 = false;
        }

        let current = Endpoint { t: stp, f, d: dg };
        let update = if stage1 && ftest1 < f && f <= bx.f {
            // Work on the modified function psi(t) = f(t) - f(0) - ftol * t * f'(0)
            // until stage one ends.
            let shift = |e: Endpoint<T>| Endpoint {
                t: e.t,
                f: e.f - e.t * dgtest,
                d: e.d - dgtest,
            };
            let unshift = |e: Endpoint<T>| Endpoint {
                t: e.t,
                f: e.f + e.t * dgtest,
                d: e.d + dgtest,
            };
            let mut mx = shift(bx);
            let mut my = shift(by);
            let result = update_trial_interval(
                &mut mx,
                &mut my,
                &mut stp,
                shift(current),
                stmin,
                stmax,
                &mut brackt,
            );
            bx = unshift(mx);
            by = unshift(my);
            result
        } else {
            update_trial_interval(&mut bx, &mut by, &mut stp, current, stmin, stmax, &mut brackt)
        };

        if let Err(e) = update {
            trace!("more_thuente: interval update failed: {}", e);
            interval_ok = false;
        }

        // Force a sufficient decrease in the width of the interval.
        if brackt {
            if shrink * prev_width <= (by.t - bx.t).abs() {
                stp = bx.t + half * (by.t - bx.t);
            }
            prev_width = width;
            width = (by.t - bx.t).abs();
        }
    }
}

/// Computes a safeguarded trial step and updates the interval of uncertainty.
///
/// `x` holds the best step so far, `y` the other endpoint, and `trial` the
/// step just evaluated, whose value is written to `t` before the new trial
/// step replaces it. The derivative at `x` must point towards `t`.
fn update_trial_interval<T: Float + Debug>(
    x: &mut Endpoint<T>,
    y: &mut Endpoint<T>,
    t: &mut T,
    trial: Endpoint<T>,
    tmin: T,
    tmax: T,
    brackt: &mut bool,
) -> Result<(), LineSearchError> {
    let ft = trial.f;
    let dt = trial.d;
    let dsign = dt * (x.d / x.d.abs()) < T::zero();

    if *brackt {
        if *t <= x.t.min(y.t) || x.t.max(y.t) <= *t {
            return Err(LineSearchError::OutOfInterval);
        }
        if T::zero() <= x.d * (*t - x.t) {
            return Err(LineSearchError::IncreaseGradient);
        }
        if tmax < tmin {
            return Err(LineSearchError::IncorrectTminmax);
        }
    }

    let half: T = lit(0.5);
    let (newt, bound) = if x.f < ft {
        // Case 1: a higher function value brackets the minimum. Take the
        // cubic step if it is closer to x, else the average of both.
        *brackt = true;
        let mc = cubic_minimizer(x.t, x.f, x.d, *t, ft, dt);
        let mq = quadratic_minimizer(x.t, x.f, x.d, *t, ft);
        if (mc - x.t).abs() < (mq - x.t).abs() {
            (mc, true)
        } else {
            (mc + half * (mq - mc), true)
        }
    } else if dsign {
        // Case 2: derivatives of opposite sign bracket the minimum. Take the
        // step farther from t.
        *brackt = true;
        let mc = cubic_minimizer(x.t, x.f, x.d, *t, ft, dt);
        let mq = secant_minimizer(x.t, x.d, *t, dt);
        if (mc - *t).abs() > (mq - *t).abs() {
            (mc, false)
        } else {
            (mq, false)
        }
    } else if dt.abs() < x.d.abs() {
        // Case 3: same sign, decreasing slope magnitude.
        let mc = cubic_minimizer_bounded(x.t, x.f, x.d, *t, ft, dt, tmin, tmax);
        let mq = secant_minimizer(x.t, x.d, *t, dt);
        let newt = if *brackt {
            if (*t - mc).abs() < (*t - mq).abs() {
                mc
            } else {
                mq
            }
        } else if (*t - mc).abs() > (*t - mq).abs() {
            mc
        } else {
            mq
        };
        (newt, true)
    } else {
        // Case 4: same sign, slope not decreasing.
        let newt = if *brackt {
            cubic_minimizer(*t, ft, dt, y.t, y.f, y.d)
        } else if x.t < *t {
            tmax
        } else {
            tmin
        };
        (newt, false)
    };

    // Update the interval of uncertainty; this does not depend on the new step.
    if x.f < ft {
        *y = trial;
    } else {
        if dsign {
            *y = *x;
        }
        *x = trial;
    }

    let mut newt = newt.min(tmax).max(tmin);

    // Keep the new step away from the far end of a bracketing interval.
    if *brackt && bound {
        let mq = x.t + lit::<T>(0.66) * (y.t - x.t);
        newt = if x.t < y.t { newt.min(mq) } else { newt.max(mq) };
    }

    *t = newt;
    Ok(())
}

/// Minimizer of the cubic interpolating `(u, fu, du)` and `(v, fv, dv)`.
fn cubic_minimizer<T: Float>(u: T, fu: T, du: T, v: T, fv: T, dv: T) -> T {
    let d = v - u;
    let theta = (fu - fv) * lit(3.0) / d + du + dv;
    let s = theta.abs().max(du.abs()).max(dv.abs());
    let a = theta / s;
    let mut gamma = s * (a * a - (du / s) * (dv / s)).sqrt();
    if v < u {
        gamma = -gamma;
    }
    let p = gamma - du + theta;
    let q = gamma - du + gamma + dv;
    u + (p / q) * d
}

/// Cubic minimizer for case 3, falling back to `xmin`/`xmax` when the cubic
/// does not have a minimizer beyond `v`.
#[allow(clippy::too_many_arguments)]
fn cubic_minimizer_bounded<T: Float>(u: T, fu: T, du: T, v: T, fv: T, dv: T, xmin: T, xmax: T) -> T {
    let d = v - u;
    let theta = (fu - fv) * lit(3.0) / d + du + dv;
    let s = theta.abs().max(du.abs()).max(dv.abs());
    let a = theta / s;
    let mut gamma = s * (a * a - (du / s) * (dv / s)).max(T::zero()).sqrt();
    if u < v {
        gamma = -gamma;
    }
    let p = gamma - dv + theta;
    let q = gamma - dv + gamma + du;
    let r = p / q;
    if r < T::zero() && gamma != T::zero() {
        v - r * d
    } else if v > u {
        xmax
    } else {
        xmin
    }
}

/// Minimizer of the quadratic through `(u, fu)` and `(v, fv)` with slope `du` at `u`.
fn quadratic_minimizer<T: Float>(u: T, fu: T, du: T, v: T, fv: T) -> T {
    let a = v - u;
    u + du / ((fu - fv) / a + du) / lit(2.0) * a
}

/// Minimizer of the quadratic with slopes `du` at `u` and `dv` at `v`.
fn secant_minimizer<T: Float>(u: T, du: T, v: T, dv: T) -> T {
    let a = u - v;
    v + dv / (dv - du) * a
}
