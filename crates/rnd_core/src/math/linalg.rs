//! Dense symmetric positive-definite linear solves.
//!
//! This module provides the numerical kernel behind every local fit: small
//! normal-equation systems solved by Cholesky factorisation.
//!
//! # Algorithm
//!
//! ```text
//! A = L L^T        (factorise, pivot floor checked per diagonal)
//! L y = b          (forward substitution)
//! L^T x = y        (backward substitution)
//! ```
//!
//! Near-singularity is detected, never papered over: a diagonal pivot below
//! `PIVOT_FLOOR` relative to the largest diagonal entry fails the
//! factorisation with [`LinAlgError::NearSingular`]. [`solve_regularized`]
//! recovers by adding an escalating ridge term to the diagonal before
//! giving up with [`LinAlgError::Singular`].
//!
//! All functions are pure and allocate their own scratch, so they are
//! reentrant and safe to call concurrently from independent workers.
//!
//! # Example
//!
//! ```
//! use rnd_core::math::linalg::solve_spd;
//!
//! // [[4, 2], [2, 2]] x = [8, 5]  =>  x = [1.5, 1.0]
//! let a = vec![vec![4.0, 2.0], vec![2.0, 2.0]];
//! let x = solve_spd(&a, &[8.0, 5.0]).unwrap();
//! assert!((x[0] - 1.5).abs() < 1e-12);
//! assert!((x[1] - 1.0).abs() < 1e-12);
//! ```

use crate::types::error::LinAlgError;

/// Relative pivot floor below which a factorisation is declared
/// near-singular.
pub const PIVOT_FLOOR: f64 = 1e-12;

/// Initial ridge magnitude relative to the largest diagonal entry.
pub const RIDGE_SCALE: f64 = 1e-8;

/// Multiplier applied to the ridge on each escalation.
pub const RIDGE_GROWTH: f64 = 100.0;

/// Maximum number of regularised attempts before reporting failure.
pub const MAX_RIDGE_ATTEMPTS: usize = 4;

/// Solve `A x = b` for symmetric positive-definite `A`.
///
/// # Arguments
///
/// * `a` - Square symmetric matrix, row-major `Vec` of rows
/// * `b` - Right-hand side, same length as `a`
///
/// # Returns
///
/// * `Ok(x)` - The solution vector
/// * `Err(LinAlgError)` - Dimension mismatch or near-singular system
pub fn solve_spd(a: &[Vec<f64>], b: &[f64]) -> Result<Vec<f64>, LinAlgError> {
    check_dimensions(a, b)?;
    let floor = pivot_floor(a);
    cholesky_solve(a, b, floor)
}

/// Outcome of a regularised solve.
///
/// `ridged` records whether the plain factorisation failed and a ridge term
/// was required; callers count ridged solves as numerically degraded.
#[derive(Debug, Clone, PartialEq)]
pub struct SpdSolution {
    /// The solution vector.
    pub x: Vec<f64>,
    /// Whether a ridge term was needed to factorise the system.
    pub ridged: bool,
}

/// Solve `A x = b`, retrying with an escalating ridge on near-singularity.
///
/// The ridge starts at `RIDGE_SCALE` times the largest diagonal entry and
/// grows by `RIDGE_GROWTH` per attempt, up to `MAX_RIDGE_ATTEMPTS`
/// attempts. The regularised solve is the standard response to
/// ill-conditioned local designs (tiny bandwidths, sparse windows); the
/// `ridged` flag lets the caller mark the result as degraded.
///
/// # Returns
///
/// * `Ok(solution)` - Solution of the original or a ridged system
/// * `Err(LinAlgError::Singular)` - Every attempt failed
pub fn solve_regularized(a: &[Vec<f64>], b: &[f64]) -> Result<SpdSolution, LinAlgError> {
    check_dimensions(a, b)?;
    let floor = pivot_floor(a);
    if let Ok(x) = cholesky_solve(a, b, floor) {
        return Ok(SpdSolution { x, ridged: false });
    }

    let n = b.len();
    let max_diag = max_diagonal(a).max(1.0);
    let mut ridge = RIDGE_SCALE * max_diag;
    for _ in 0..MAX_RIDGE_ATTEMPTS {
        let mut ridged = a.to_vec();
        for (i, row) in ridged.iter_mut().enumerate().take(n) {
            row[i] += ridge;
        }
        if let Ok(x) = cholesky_solve(&ridged, b, pivot_floor(&ridged)) {
            return Ok(SpdSolution { x, ridged: true });
        }
        ridge *= RIDGE_GROWTH;
    }
    Err(LinAlgError::Singular {
        attempts: MAX_RIDGE_ATTEMPTS,
    })
}

fn check_dimensions(a: &[Vec<f64>], b: &[f64]) -> Result<(), LinAlgError> {
    let n = b.len();
    if a.len() != n || a.iter().any(|row| row.len() != n) {
        return Err(LinAlgError::DimensionMismatch {
            rows: a.len(),
            cols: a.first().map_or(0, Vec::len),
            rhs: n,
        });
    }
    Ok(())
}

fn max_diagonal(a: &[Vec<f64>]) -> f64 {
    a.iter()
        .enumerate()
        .map(|(i, row)| row[i].abs())
        .fold(0.0, f64::max)
}

fn pivot_floor(a: &[Vec<f64>]) -> f64 {
    PIVOT_FLOOR * max_diagonal(a).max(f64::MIN_POSITIVE)
}

/// Cholesky factorise-and-solve with an absolute pivot floor.
fn cholesky_solve(a: &[Vec<f64>], b: &[f64], floor: f64) -> Result<Vec<f64>, LinAlgError> {
    let n = b.len();
    if n == 0 {
        return Ok(Vec::new());
    }

    // Factorise A = L L^T
    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }
            if i == j {
                if sum <= floor {
                    return Err(LinAlgError::NearSingular {
                        pivot: sum,
                        index: i,
                    });
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    // Forward substitution: L y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * y[j];
        }
        y[i] = sum / l[i][i];
    }

    // Backward substitution: L^T x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }

    Ok(x)
}
