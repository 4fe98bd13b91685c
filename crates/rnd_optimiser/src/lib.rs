//! # rnd_optimiser
//!
//! Bandwidth cross-validation and adaptive grid search for nonparametric
//! risk-neutral density estimation.
//!
//! This crate sits between the foundation types in `rnd_core` and the
//! service layer, solving the inverse problem of the estimator: choosing
//! the pair of smoothing bandwidths (hc, hp) that minimises a
//! leave-one-out cross-validation criterion.
//!
//! ## Modules
//!
//! - `local_fit`: Constrained local-polynomial fits (the per-point QP)
//! - `cv`: Leave-one-out cross-validation objective for one (hc, hp)
//! - `grid`: Parallel evaluation of the objective over a 2-D bandwidth grid
//! - `search`: Coarse-to-fine adaptive bandwidth search
//! - `config`: Tunable bounds and budgets for the search
//!
//! ## Example
//!
//! ```rust,ignore
//! use rnd_optimiser::prelude::*;
//!
//! let config = BandwidthSearchConfig::builder()
//!     .hc_range(0.75, 2.0)
//!     .hp_range(0.75, 2.0)
//!     .grid_size(32)
//!     .build();
//! let optimiser = AdaptiveBandwidthOptimizer::new(&market, &grid, config)?;
//! let result = optimiser.run()?;
//! println!("hc = {}, hp = {}", result.bandwidths.hc, result.bandwidths.hp);
//! ```

pub mod config;
pub mod cv;
pub mod grid;
pub mod local_fit;
pub mod search;

mod error;

pub use error::EstimatorError;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{BandwidthSearchConfig, BandwidthSearchConfigBuilder};
    pub use crate::cv::{CrossValidationEvaluator, CvOutcome, CvTerms};
    pub use crate::grid::{GridEvaluator, GridStats, GridStatsSnapshot, ObjectiveMatrix};
    pub use crate::local_fit::{ActiveSetSolver, LocalFitProblem, QpSolution};
    pub use crate::search::{AdaptiveBandwidthOptimizer, BandwidthSearchResult};
    pub use crate::EstimatorError;
}
