//! CLI error type.

use rnd_core::types::InputError;
use rnd_optimiser::EstimatorError;
use thiserror::Error;

/// Errors surfaced to the command line.
#[derive(Error, Debug)]
pub enum CliError {
    /// A required input file is missing.
    #[error("file not found: {0}")]
    FileNotFound(String),

    /// An input file could not be read or written.
    #[error("failed to access {path}: {source}")]
    Io {
        /// Path of the offending file.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A line of an input file is not a number.
    #[error("invalid number at {path}:{line}: {value:?}")]
    Parse {
        /// Path of the offending file.
        path: String,
        /// One-based line number.
        line: usize,
        /// The unparseable text.
        value: String,
    },

    /// Malformed quote arrays or invalid search bounds.
    #[error(transparent)]
    Input(#[from] InputError),

    /// Grid evaluation or search failure.
    #[error(transparent)]
    Estimator(#[from] EstimatorError),

    /// Result serialisation failure.
    #[error("failed to serialise result: {0}")]
    Json(#[from] serde_json::Error),
}

/// CLI result alias.
pub type Result<T> = std::result::Result<T, CliError>;
