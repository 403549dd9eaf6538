//! Limited-memory BFGS (L-BFGS) minimization with orthant-wise L1
//! regularization (OWL-QN).
//!
//! The caller supplies the starting point, an evaluator that returns the
//! objective and fills the gradient, and optionally a progress callback
//! that may cancel the run. [`minimize`] overwrites the starting point with
//! the final iterate and returns a [`Report`] describing how the run ended.
//!
//! ```
//! use lbfgs::{minimize, LineSearchAlgorithm, Parameters, Status};
//! use std::ops::ControlFlow;
//!
//! // f(x, y) = (x - 1)^2 + 10 (y + 2)^2
//! let mut x = vec![0.0, 0.0];
//! let params = Parameters::default().with_linesearch(LineSearchAlgorithm::BacktrackingArmijo);
//! let report = minimize(
//!     &mut x,
//!     |_: &mut (), x: &[f64], g: &mut [f64], _step: f64| {
//!         g[0] = 2.0 * (x[0] - 1.0);
//!         g[1] = 20.0 * (x[1] + 2.0);
//!         (x[0] - 1.0).powi(2) + 10.0 * (x[1] + 2.0).powi(2)
//!     },
//!     &mut (),
//!     &params,
//!     |_: &mut (), _info: &lbfgs::ProgressInfo<'_, f64>| ControlFlow::Continue(()),
//! )
//! .unwrap();
//!
//! assert_eq!(report.status, Status::Converged);
//! assert!((x[0] - 1.0).abs() < 1e-4);
//! assert!((x[1] + 2.0).abs() < 1e-4);
//! ```

pub mod driver;
pub mod evaluate;
pub mod history;
pub mod line_search;
pub mod orthantwise;
pub mod params;
pub mod progress;
pub mod status;
pub mod vector;

pub use driver::{minimize, Lbfgs};
pub use evaluate::Evaluate;
pub use history::{Correction, History};
pub use line_search::LineSearchAlgorithm;
pub use orthantwise::Orthantwise;
pub use params::{default_parameters, Parameters};
pub use progress::{LogProgress, Progress, ProgressInfo, Silent};
pub use status::{Error, LineSearchError, ParameterError, Report, Result, Status};
