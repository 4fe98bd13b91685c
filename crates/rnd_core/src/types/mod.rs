//! Core market-data and search-domain types.
//!
//! This module provides:
//! - `quote`: Option quote data (`OptionQuote`, `QuoteSide`, `MarketQuotes`, `OptionSide`)
//! - `grid`: Evaluation abscissae and bandwidths (`UnderlyingGrid`, `BandwidthPair`)
//! - `error`: Structured error types for input validation, linear algebra, and resources
//!
//! # Re-exports
//!
//! For convenience, commonly used types are re-exported at this module level:
//! - [`OptionQuote`], [`QuoteSide`], [`MarketQuotes`], [`OptionSide`] from `quote`
//! - [`UnderlyingGrid`], [`BandwidthPair`] from `grid`
//! - [`InputError`], [`LinAlgError`], [`ResourceError`] from `error`

pub mod error;
pub mod grid;
pub mod quote;

// Re-export commonly used types at module level
pub use error::{InputError, LinAlgError, ResourceError};
pub use grid::{BandwidthPair, UnderlyingGrid};
pub use quote::{MarketQuotes, OptionQuote, OptionSide, QuoteSide};
