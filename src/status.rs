//! Termination status and error types.
//!
//! Invalid input is an [`Error`] returned before the evaluator is ever called.
//! Every other way a run can end is a [`Status`] carried by the [`Report`],
//! together with the objective value at the returned point.

use std::fmt;

/// Why a parameter set was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParameterError {
    #[error("invalid number of variables: the vector must not be empty")]
    InvalidN,
    #[error("invalid history size: m must be positive")]
    InvalidHistorySize,
    #[error("invalid parameter epsilon: must be non-negative")]
    InvalidEpsilon,
    #[error("invalid parameter delta: must be non-negative")]
    InvalidDelta,
    #[error("invalid parameter min_step: must be non-negative")]
    InvalidMinStep,
    #[error("invalid parameter max_step: must be greater than min_step")]
    InvalidMaxStep,
    #[error("invalid parameter ftol: must be non-negative")]
    InvalidFtol,
    #[error("invalid parameter wolfe: must lie in (ftol, 1)")]
    InvalidWolfe,
    #[error("invalid parameter gtol: must be non-negative")]
    InvalidGtol,
    #[error("invalid parameter xtol: must be non-negative")]
    InvalidXtol,
    #[error("invalid parameter max_linesearch: must be positive")]
    InvalidMaxLineSearch,
    #[error("invalid parameter orthantwise_c: must be non-negative")]
    InvalidOrthantwise,
    #[error("invalid parameter orthantwise_start: must be less than n and orthantwise_end")]
    InvalidOrthantwiseStart,
    #[error("invalid parameter orthantwise_end: must not exceed n")]
    InvalidOrthantwiseEnd,
}

impl ParameterError {
    /// The matching liblbfgs return code.
    pub fn code(&self) -> i32 {
        match self {
            ParameterError::InvalidN => -1020,
            ParameterError::InvalidEpsilon => -1017,
            ParameterError::InvalidDelta => -1015,
            ParameterError::InvalidMinStep => -1013,
            ParameterError::InvalidMaxStep => -1012,
            ParameterError::InvalidFtol => -1011,
            ParameterError::InvalidWolfe => -1010,
            ParameterError::InvalidGtol => -1009,
            ParameterError::InvalidXtol => -1008,
            ParameterError::InvalidMaxLineSearch => -1007,
            ParameterError::InvalidOrthantwise => -1006,
            ParameterError::InvalidOrthantwiseStart => -1005,
            ParameterError::InvalidOrthantwiseEnd => -1004,
            // liblbfgs has no dedicated code for a zero history size.
            ParameterError::InvalidHistorySize => -1023,
        }
    }
}

/// Why a line search gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LineSearchError {
    #[error("the line-search step became smaller than min_step")]
    MinimumStep,
    #[error("the line-search step became larger than max_step")]
    MaximumStep,
    #[error("the line search reached max_linesearch trials")]
    MaximumLineSearch,
    #[error("the search direction does not decrease the objective")]
    IncreaseGradient,
    #[error("rounding errors prevent further progress")]
    RoundingError,
    #[error("the relative width of the interval of uncertainty is at most xtol")]
    WidthTooSmall,
    #[error("the trial step went out of the interval of uncertainty")]
    OutOfInterval,
    #[error("the interval of uncertainty became too small")]
    IncorrectTminmax,
    #[error("the initial line-search step must be positive")]
    InvalidParameters,
}

impl LineSearchError {
    /// The matching liblbfgs return code.
    pub fn code(&self) -> i32 {
        match self {
            LineSearchError::OutOfInterval => -1003,
            LineSearchError::IncorrectTminmax => -1002,
            LineSearchError::RoundingError => -1001,
            LineSearchError::MinimumStep => -1000,
            LineSearchError::MaximumStep => -999,
            LineSearchError::MaximumLineSearch => -998,
            LineSearchError::WidthTooSmall => -996,
            LineSearchError::InvalidParameters => -995,
            LineSearchError::IncreaseGradient => -994,
        }
    }
}

/// Errors reported before an optimization run starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    InvalidParameter(#[from] ParameterError),
}

impl Error {
    /// The matching liblbfgs return code.
    pub fn code(&self) -> i32 {
        match self {
            Error::InvalidParameter(e) => e.code(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// How an optimization run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The gradient test `||g|| / max(1, ||x||) <= epsilon` succeeded.
    Converged,
    /// The objective decreased by less than `delta` over the last `past` iterations.
    Stop,
    /// The starting point already satisfied the gradient test.
    AlreadyMinimized,
    /// `max_iterations` iterations completed without convergence.
    MaxIterationsReached,
    /// The line search failed; the previous iterate was returned.
    LineSearchFailed(LineSearchError),
    /// The progress callback asked the run to stop.
    Canceled,
}

impl Status {
    /// True for the three convergence outcomes.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            Status::Converged | Status::Stop | Status::AlreadyMinimized
        )
    }

    /// The matching liblbfgs return code.
    pub fn code(&self) -> i32 {
        match self {
            Status::Converged => 0,
            Status::Stop => 1,
            Status::AlreadyMinimized => 2,
            Status::Canceled => -1021,
            Status::MaxIterationsReached => -997,
            Status::LineSearchFailed(e) => e.code(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Converged => write!(f, "converged"),
            Status::Stop => write!(f, "stopped by the delta test"),
            Status::AlreadyMinimized => write!(f, "initial point already minimizes the objective"),
            Status::MaxIterationsReached => write!(f, "maximum number of iterations reached"),
            Status::LineSearchFailed(e) => write!(f, "line search failed: {e}"),
            Status::Canceled => write!(f, "canceled by the progress callback"),
        }
    }
}

/// Outcome of [`minimize`](crate::minimize). The final point is written back
/// into the caller's vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Report<T> {
    /// Terminal classification of the run.
    pub status: Status,
    /// Objective value at the returned point, L1 penalty included.
    pub fx: T,
    /// Number of completed iterations.
    pub iterations: usize,
    /// Number of evaluator calls.
    pub evaluations: usize,
}
