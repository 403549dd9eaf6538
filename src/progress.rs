use log::info;
use std::fmt::{self, LowerExp};
use std::ops::ControlFlow;

/// Snapshot handed to the progress callback after every iteration.
#[derive(Debug, Clone, Copy)]
pub struct ProgressInfo<'a, T> {
    /// Current point.
    pub x: &'a [T],
    /// Gradient of the smooth part of the objective at `x`.
    pub g: &'a [T],
    /// Objective value at `x`, L1 penalty included.
    pub fx: T,
    /// `||x||`
    pub xnorm: T,
    /// `||g||`, or the norm of the pseudo-gradient under OWL-QN.
    pub gnorm: T,
    /// Step length accepted by the line search.
    pub step: T,
    /// Number of variables.
    pub n: usize,
    /// Iteration number, starting at 1.
    pub k: usize,
    /// Trial evaluations spent by the line search of this iteration.
    pub ls: usize,
}

/// Prints `k ls fx xnorm gnorm step` as one fixed-width line.
impl<T: LowerExp> fmt::Display for ProgressInfo<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:4} {:4} {:.10e} {:.5e} {:.5e} {:.3e}",
            self.k, self.ls, self.fx, self.xnorm, self.gnorm, self.step
        )
    }
}

/// Progress callback.
///
/// Returning [`ControlFlow::Break`] cancels the run; the point reported in
/// `info` becomes the result. Any closure
/// `FnMut(&mut C, &ProgressInfo<T>) -> ControlFlow<()>` is a progress callback.
pub trait Progress<C, T> {
    fn progress(&mut self, ctx: &mut C, info: &ProgressInfo<'_, T>) -> ControlFlow<()>;
}

impl<C, T, F> Progress<C, T> for F
where
    F: FnMut(&mut C, &ProgressInfo<'_, T>) -> ControlFlow<()>,
{
    fn progress(&mut self, ctx: &mut C, info: &ProgressInfo<'_, T>) -> ControlFlow<()> {
        self(ctx, info)
    }
}

/// Never interrupts and reports nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl<C, T> Progress<C, T> for Silent {
    fn progress(&mut self, _ctx: &mut C, _info: &ProgressInfo<'_, T>) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

/// Logs every iteration at `info` level and never interrupts.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl<C, T: LowerExp> Progress<C, T> for LogProgress {
    fn progress(&mut self, _ctx: &mut C, info: &ProgressInfo<'_, T>) -> ControlFlow<()> {
        info!("{}", info);
        ControlFlow::Continue(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample<'a>(x: &'a [f64], g: &'a [f64]) -> ProgressInfo<'a, f64> {
        ProgressInfo {
            x,
            g,
            fx: 0.5,
            xnorm: 1.0,
            gnorm: 2.0,
            step: 0.25,
            n: x.len(),
            k: 3,
            ls: 1,
        }
    }

    #[test]
    fn test_display_line() {
        let info = sample(&[1.0], &[2.0]);
        assert_eq!(
            info.to_string(),
            "   3    1 5.0000000000e-1 1.00000e0 2.00000e0 2.500e-1"
        );
    }

    #[test]
    fn test_builtin_reporters_continue() {
        let info = sample(&[1.0], &[2.0]);
        assert_eq!(Silent.progress(&mut (), &info), ControlFlow::Continue(()));
        assert_eq!(LogProgress.progress(&mut (), &info), ControlFlow::Continue(()));
    }

    #[test]
    fn test_closure_sees_context() {
        let info = sample(&[1.0], &[2.0]);
        let mut seen = Vec::new();
        let mut stop_after_two = |seen: &mut Vec<usize>, info: &ProgressInfo<'_, f64>| {
            seen.push(info.k);
            if seen.len() >= 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        };
        assert_eq!(stop_after_two.progress(&mut seen, &info), ControlFlow::Continue(()));
        assert_eq!(stop_after_two.progress(&mut seen, &info), ControlFlow::Break(()));
        assert_eq!(seen, vec![3, 3]);
    }
}
