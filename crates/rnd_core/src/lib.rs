//! # rnd_core: Foundation for Nonparametric RND Bandwidth Calibration
//!
//! ## Layer Role
//!
//! rnd_core is the bottom layer of the workspace, providing:
//! - Validated market-data types: `OptionQuote`, `QuoteSide`, `MarketQuotes`
//!   (`types::quote`)
//! - Evaluation abscissae and bandwidths: `UnderlyingGrid`, `BandwidthPair`
//!   (`types::grid`)
//! - Error types: `InputError`, `ResourceError`, `LinAlgError` (`types::error`)
//! - Dense SPD linear solves with ridge regularisation (`math::linalg`)
//! - Gaussian smoothing kernel and normal distribution functions
//!   (`math::kernel`)
//!
//! ## Zero Dependency Principle
//!
//! rnd_core has no dependencies on other workspace crates, with minimal
//! external dependencies:
//! - num-traits: Traits for generic numerical computation
//! - thiserror: Structured error derives
//! - serde: Serialisation support (optional)
//!
//! ## Usage Examples
//!
//! ```rust
//! use rnd_core::math::kernel::kernel_weight;
//! use rnd_core::types::{BandwidthPair, UnderlyingGrid};
//!
//! // Evaluation grid over the underlying price range
//! let grid = UnderlyingGrid::from_range(50.0, 150.0, 101).unwrap();
//! assert_eq!(grid.len(), 101);
//!
//! // A pair of strictly positive smoothing bandwidths
//! let bw = BandwidthPair::new(1.5, 2.0).unwrap();
//! assert!(bw.hc > 0.0 && bw.hp > 0.0);
//!
//! // Kernel weights decay away from the evaluation point
//! assert!(kernel_weight(0.0, 1.5) > kernel_weight(3.0, 1.5));
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): Enable serialisation for quote and grid types

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod math;
pub mod types;
