use num_traits::Float;
use std::fmt::Debug;

use crate::line_search::LineSearchAlgorithm;
use crate::orthantwise::Orthantwise;
use crate::status::ParameterError;
use crate::vector::lit;

/// Configuration of one optimization run.
///
/// A run never mutates its parameters; build a value with
/// [`default_parameters`] (or `Parameters::default()`) and override fields
/// directly or through the `with_*` methods.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters<T> {
    /// Number of `(s, y)` correction pairs kept in the history (default: 6).
    pub m: usize,
    /// Gradient convergence threshold (default: 1e-5).
    ///
    /// The run converges when `||g|| / max(1, ||x||) <= epsilon`.
    pub epsilon: T,
    /// Window, in iterations, of the relative-decrease test (default: 0, disabled).
    pub past: usize,
    /// Relative-decrease threshold used when `past > 0` (default: 1e-5).
    pub delta: T,
    /// Iteration cap, 0 meaning unlimited (default: 0).
    pub max_iterations: usize,
    /// Line search used by plain L-BFGS (default: More–Thuente).
    ///
    /// Ignored when `orthantwise_c > 0`; OWL-QN always runs its own
    /// backtracking search.
    pub linesearch: LineSearchAlgorithm,
    /// Maximum number of trial evaluations per line search (default: 20).
    pub max_linesearch: usize,
    /// Smallest admissible step (default: 1e-20).
    pub min_step: T,
    /// Largest admissible step (default: 1e20).
    pub max_step: T,
    /// Sufficient decrease parameter (default: 1e-4).
    pub ftol: T,
    /// Curvature parameter of the backtracking Wolfe searches (default: 0.9).
    pub wolfe: T,
    /// Curvature parameter of the More–Thuente search (default: 0.9).
    pub gtol: T,
    /// Relative width of the interval of uncertainty below which the
    /// More–Thuente search gives up (default: 1e-16).
    pub xtol: T,
    /// Coefficient of the L1 penalty `c * |x|_1`; 0 disables OWL-QN (default: 0).
    pub orthantwise_c: T,
    /// First penalized index (default: 0).
    pub orthantwise_start: usize,
    /// One past the last penalized index; `None` means `n` (default: `None`).
    pub orthantwise_end: Option<usize>,
}

impl<T> Default for Parameters<T>
where
    T: Float + Debug,
{
    fn default() -> Self {
        Self {
            m: 6,
            epsilon: lit(1e-5),
            past: 0,
            delta: lit(1e-5),
            max_iterations: 0,
            linesearch: LineSearchAlgorithm::default(),
            max_linesearch: 20,
            min_step: lit(1e-20),
            max_step: lit(1e20),
            ftol: lit(1e-4),
            wolfe: lit(0.9),
            gtol: lit(0.9),
            xtol: lit(1e-16),
            orthantwise_c: T::zero(),
            orthantwise_start: 0,
            orthantwise_end: None,
        }
    }
}

/// Returns a freshly built parameter set holding the defaults.
///
/// Every call produces an independent value, so overriding a field in one
/// run never leaks into another.
///
/// # Examples
///
/// ```
/// use lbfgs::default_parameters;
///
/// let mut params = default_parameters::<f64>();
/// params.epsilon = 1e-30;
/// params.past = 3;
///
/// assert_eq!(default_parameters::<f64>().epsilon, 1e-5);
/// ```
#[must_use]
pub fn default_parameters<T: Float + Debug>() -> Parameters<T> {
    Parameters::default()
}

impl<T> Parameters<T>
where
    T: Float + Debug,
{
    /// Sets the number of correction pairs kept, `m`.
    pub fn with_history_size(self, m: usize) -> Self {
        Self { m, ..self }
    }

    /// Sets the gradient convergence threshold.
    pub fn with_epsilon(self, epsilon: T) -> Self {
        Self { epsilon, ..self }
    }

    /// Enables the relative-decrease test over a window of `past` iterations.
    pub fn with_delta_test(self, past: usize, delta: T) -> Self {
        Self {
            past,
            delta,
            ..self
        }
    }

    /// Caps the number of iterations; `0` means no cap.
    pub fn with_max_iterations(self, max_iterations: usize) -> Self {
        Self {
            max_iterations,
            ..self
        }
    }

    /// Selects the line search used when OWL-QN is off.
    pub fn with_linesearch(self, linesearch: LineSearchAlgorithm) -> Self {
        Self { linesearch, ..self }
    }

    /// Caps the trial evaluations of one line search.
    pub fn with_max_linesearch(self, max_linesearch: usize) -> Self {
        Self {
            max_linesearch,
            ..self
        }
    }

    /// Sets the interval `[min_step, max_step]` every accepted step lies in.
    pub fn with_step_bounds(self, min_step: T, max_step: T) -> Self {
        Self {
            min_step,
            max_step,
            ..self
        }
    }

    /// Enables OWL-QN with penalty `c * sum |x_i|` over `start..end`
    /// (`end = None` meaning the whole vector).
    pub fn with_orthantwise(self, c: T, start: usize, end: Option<usize>) -> Self {
        Self {
            orthantwise_c: c,
            orthantwise_start: start,
            orthantwise_end: end,
            ..self
        }
    }

    /// Checks the parameters against a problem of dimension `n`.
    ///
    /// Comparisons are written so that NaN fields are rejected.
    pub fn validate(&self, n: usize) -> Result<(), ParameterError> {
        if n == 0 {
            return Err(ParameterError::InvalidN);
        }
        if self.m == 0 {
            return Err(ParameterError::InvalidHistorySize);
        }
        if !(self.epsilon >= T::zero()) {
            return Err(ParameterError::InvalidEpsilon);
        }
        if !(self.delta >= T::zero()) {
            return Err(ParameterError::InvalidDelta);
        }
        if !(self.min_step >= T::zero()) {
            return Err(ParameterError::InvalidMinStep);
        }
        if !(self.max_step > self.min_step) {
            return Err(ParameterError::InvalidMaxStep);
        }
        if !(self.ftol >= T::zero()) {
            return Err(ParameterError::InvalidFtol);
        }
        if matches!(
            self.linesearch,
            LineSearchAlgorithm::BacktrackingWolfe | LineSearchAlgorithm::BacktrackingStrongWolfe
        ) && !(self.ftol < self.wolfe && self.wolfe < T::one())
        {
            return Err(ParameterError::InvalidWolfe);
        }
        if !(self.gtol >= T::zero()) {
            return Err(ParameterError::InvalidGtol);
        }
        if !(self.xtol >= T::zero()) {
            return Err(ParameterError::InvalidXtol);
        }
        if self.max_linesearch == 0 {
            return Err(ParameterError::InvalidMaxLineSearch);
        }
        if !(self.orthantwise_c >= T::zero()) {
            return Err(ParameterError::InvalidOrthantwise);
        }
        let end = self.orthantwise_end.unwrap_or(n);
        if end > n {
            return Err(ParameterError::InvalidOrthantwiseEnd);
        }
        if self.orthantwise_start >= end {
            return Err(ParameterError::InvalidOrthantwiseStart);
        }
        Ok(())
    }

    /// The L1 penalty of a validated parameter set, or `None` when OWL-QN is off.
    pub(crate) fn orthantwise(&self, n: usize) -> Option<Orthantwise<T>> {
        if self.orthantwise_c > T::zero() {
            Some(Orthantwise::new(
                self.orthantwise_c,
                self.orthantwise_start,
                self.orthantwise_end.unwrap_or(n),
            ))
        } else {
            None
        }
    }
}
