//! Constrained local-polynomial fitting.
//!
//! Each held-out strike gives rise to one small quadratic program: a
//! kernel-weighted least-squares fit of a low-degree polynomial to the
//! neighbouring quotes, subject to the no-arbitrage shape bounds on its
//! coefficients. This module provides:
//!
//! - `problem`: Assembly of the weighted design ([`LocalFitProblem`])
//! - `constraints`: No-arbitrage coefficient bounds ([`CoefficientBound`])
//! - `qp`: The active-set solver ([`ActiveSetSolver`], [`QpSolution`])

pub mod constraints;
pub mod problem;
pub mod qp;

pub use constraints::{no_arbitrage_bounds, BoundKind, CoefficientBound};
pub use problem::LocalFitProblem;
pub use qp::{ActiveSetSolver, QpSolution};
