//! Estimator error type.

use rnd_core::types::{InputError, ResourceError};
use thiserror::Error;

/// Errors surfaced by grid evaluation and bandwidth search.
///
/// Input and resource failures abort a run; numerical degradation inside a
/// grid cell never reaches this type (it is contained to the cell and
/// reported through the degraded-fit counters).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimatorError {
    /// Malformed quote data or invalid search bounds.
    #[error(transparent)]
    Input(#[from] InputError),

    /// Grid working buffers could not be allocated.
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// Every grid cell was infeasible, so no best pair exists.
    #[error("no feasible grid cell after {cells_evaluated} evaluations")]
    NoFeasibleCell {
        /// Number of cells evaluated before giving up.
        cells_evaluated: usize,
    },
}
