//! Error types for structured error handling.
//!
//! This module provides:
//! - `InputError`: Malformed market data or invalid search bounds, fatal at the boundary
//! - `LinAlgError`: Dense linear-solve failures (near-singular systems)
//! - `ResourceError`: Allocation failure for grid working buffers
//!
//! `InputError` and `ResourceError` abort a run with a diagnostic.
//! `LinAlgError` is recoverable: callers either retry with a ridge term or
//! flag the affected local fit as degraded and continue.

use thiserror::Error;

/// Input validation errors.
///
/// Raised at the core boundary when quote arrays or search bounds are
/// malformed. Always fatal to the run; never retried.
///
/// # Examples
/// ```
/// use rnd_core::types::InputError;
///
/// let err = InputError::LengthMismatch {
///     field: "prices",
///     got: 3,
///     expected: 5,
/// };
/// assert!(format!("{}", err).contains("prices"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    /// Parallel quote arrays have different lengths.
    #[error("array length mismatch for {field}: got {got}, expected {expected}")]
    LengthMismatch {
        /// Name of the offending array.
        field: &'static str,
        /// Length of the offending array.
        got: usize,
        /// Length implied by the strike array.
        expected: usize,
    },

    /// A quote field is NaN or infinite.
    #[error("non-finite value in {field} at index {index}")]
    NonFinite {
        /// Name of the offending array.
        field: &'static str,
        /// Index of the offending entry.
        index: usize,
    },

    /// An open-interest weight is negative.
    #[error("negative weight {value} at index {index}")]
    NegativeWeight {
        /// Index of the offending entry.
        index: usize,
        /// The negative weight value.
        value: f64,
    },

    /// Two quotes share a strike within one side.
    #[error("duplicate strike {strike} within one side")]
    DuplicateStrike {
        /// The repeated strike.
        strike: f64,
    },

    /// A bandwidth is zero, negative, or non-finite.
    #[error("bandwidth must be strictly positive and finite, got {value}")]
    NonPositiveBandwidth {
        /// The offending bandwidth value.
        value: f64,
    },

    /// A bandwidth search range is empty or inverted.
    #[error("invalid {axis} bandwidth range [{min}, {max}]: min must be < max and positive")]
    InvalidBandwidthRange {
        /// Which axis the range belongs to ("hc" or "hp").
        axis: &'static str,
        /// Lower bound of the range.
        min: f64,
        /// Upper bound of the range.
        max: f64,
    },

    /// Grid support points are not strictly increasing.
    #[error("underlying grid is not strictly increasing at index {index}")]
    NonIncreasingGrid {
        /// Index where the ordering violation was detected.
        index: usize,
    },

    /// Too few points to build a grid or a search stage.
    #[error("insufficient points: got {got}, need at least {need}")]
    InsufficientPoints {
        /// Number of points provided.
        got: usize,
        /// Minimum number of points required.
        need: usize,
    },
}

/// Dense linear-solve errors.
///
/// Raised by the Cholesky kernel in [`crate::math::linalg`]. A near-singular
/// factorisation is reported rather than silently returning garbage; callers
/// retry with a ridge term or degrade the affected fit.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinAlgError {
    /// System dimensions do not agree.
    #[error("dimension mismatch: matrix is {rows}x{cols}, rhs has {rhs} entries")]
    DimensionMismatch {
        /// Number of matrix rows.
        rows: usize,
        /// Number of matrix columns.
        cols: usize,
        /// Length of the right-hand side.
        rhs: usize,
    },

    /// A diagonal pivot fell below the relative floor during factorisation.
    #[error("near-singular system: pivot {pivot:e} at index {index}")]
    NearSingular {
        /// Magnitude of the failing pivot.
        pivot: f64,
        /// Diagonal index of the failing pivot.
        index: usize,
    },

    /// The system stayed singular after ridge escalation.
    #[error("system remained singular after {attempts} ridge escalations")]
    Singular {
        /// Number of regularised attempts made.
        attempts: usize,
    },
}

/// Working-buffer allocation errors.
///
/// Raised when an objective-matrix buffer cannot be reserved. Fatal: the
/// grid evaluation cannot proceed without its working memory.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// The allocator refused a grid buffer reservation.
    #[error("failed to allocate grid buffer of {cells} cells")]
    AllocationFailed {
        /// Number of cells requested.
        cells: usize,
    },
}
