//! Active-set solver for the bound-constrained local fit.
//!
//! # Algorithm
//!
//! ```text
//! 1. Solve the unconstrained weighted normal equations.
//! 2. If a no-arbitrage bound is violated, pin the most-violated
//!    coefficient at its bound and re-solve the reduced system.
//! 3. Repeat until feasible or the iteration budget is exhausted.
//! ```
//!
//! Pinning a coefficient keeps the reduced normal equations symmetric
//! positive-definite, so every solve goes through the same Cholesky
//! kernel. A failed reduced solve or an exhausted budget degrades the
//! result (clamped to the bounds) instead of erroring: a single bad local
//! fit must not abort a grid stage.

use rnd_core::math::linalg::solve_regularized;
use rnd_core::types::LinAlgError;

use super::constraints::CoefficientBound;
use super::problem::LocalFitProblem;

/// Feasibility tolerance for constraint violations.
const VIOLATION_TOL: f64 = 1e-10;

/// Result of one constrained local fit.
#[derive(Debug, Clone, PartialEq)]
pub struct QpSolution {
    /// Fitted polynomial coefficients in powers of the strike offset.
    pub coefficients: Vec<f64>,
    /// Number of normal-equation solves performed.
    pub iterations: usize,
    /// Whether the result was degraded (ridge regularisation, a failed
    /// reduced solve, or an exhausted iteration budget).
    pub degraded: bool,
}

impl QpSolution {
    /// Fitted price at the evaluation point (the constant coefficient).
    pub fn fitted_value(&self) -> f64 {
        self.coefficients.first().copied().unwrap_or(0.0)
    }

    /// Implied density at `offset` from the evaluation point.
    ///
    /// The density is the second derivative of the fitted price curve,
    /// clamped at zero away from the evaluation point where the convexity
    /// bound does not reach.
    pub fn density_at(&self, offset: f64) -> f64 {
        let c2 = self.coefficients.get(2).copied().unwrap_or(0.0);
        let c3 = self.coefficients.get(3).copied().unwrap_or(0.0);
        (2.0 * c2 + 6.0 * c3 * offset).max(0.0)
    }
}

/// Active-set solver for bound-constrained weighted least squares.
#[derive(Debug, Clone)]
pub struct ActiveSetSolver {
    max_iterations: usize,
}

impl ActiveSetSolver {
    /// Create a solver with the given iteration budget.
    ///
    /// One iteration is one normal-equation solve; the bound count plus
    /// one is always sufficient, so small budgets (8) are generous.
    pub fn new(max_iterations: usize) -> Self {
        Self { max_iterations }
    }

    /// The iteration budget.
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Solve the constrained fit.
    ///
    /// Always returns a solution: on numerical failure or budget
    /// exhaustion, the best point found so far is clamped onto the bounds
    /// and flagged `degraded`.
    pub fn solve(&self, problem: &LocalFitProblem) -> QpSolution {
        let constraints = problem.constraints();
        let (ata, atb) = problem.normal_equations();
        let p = problem.n_coefficients();

        // The zero vector satisfies every no-arbitrage bound, so it is the
        // fallback when even the first solve fails.
        let mut current = vec![0.0; p];
        let mut pinned: Vec<Option<f64>> = vec![None; p];
        let mut degraded = false;
        let mut iterations = 0;

        while iterations < self.max_iterations {
            iterations += 1;
            match solve_with_pins(&ata, &atb, &pinned) {
                Ok((coeffs, ridged)) => {
                    degraded |= ridged;
                    current = coeffs;
                }
                Err(_) => {
                    degraded = true;
                    break;
                }
            }

            let worst = constraints
                .iter()
                .map(|c| (c, c.violation(&current)))
                .max_by(|a, b| a.1.total_cmp(&b.1));
            match worst {
                Some((constraint, violation)) if violation > VIOLATION_TOL => {
                    pinned[constraint.coefficient] = Some(constraint.bound);
                }
                _ => {
                    return QpSolution {
                        coefficients: current,
                        iterations,
                        degraded,
                    };
                }
            }
        }

        // Budget exhausted or reduced solve failed: clamp and degrade.
        clamp_to_bounds(&mut current, &constraints);
        QpSolution {
            coefficients: current,
            iterations,
            degraded: true,
        }
    }
}

/// Solve the normal equations with a subset of coefficients pinned.
///
/// Pinned coefficients are moved to the right-hand side; the reduced
/// system over the free coefficients stays SPD.
fn solve_with_pins(
    ata: &[Vec<f64>],
    atb: &[f64],
    pinned: &[Option<f64>],
) -> Result<(Vec<f64>, bool), LinAlgError> {
    let p = atb.len();
    let free: Vec<usize> = (0..p).filter(|&i| pinned[i].is_none()).collect();

    let mut coeffs: Vec<f64> = pinned.iter().map(|v| v.unwrap_or(0.0)).collect();
    if free.is_empty() {
        return Ok((coeffs, false));
    }

    let nf = free.len();
    let mut reduced_a = vec![vec![0.0; nf]; nf];
    let mut reduced_b = vec![0.0; nf];
    for (fi, &i) in free.iter().enumerate() {
        for (fj, &j) in free.iter().enumerate() {
            reduced_a[fi][fj] = ata[i][j];
        }
        let mut rhs = atb[i];
        for (j, pin) in pinned.iter().enumerate() {
            if let Some(value) = pin {
                rhs -= ata[i][j] * value;
            }
        }
        reduced_b[fi] = rhs;
    }

    let solution = solve_regularized(&reduced_a, &reduced_b)?;
    for (fi, &i) in free.iter().enumerate() {
        coeffs[i] = solution.x[fi];
    }
    Ok((coeffs, solution.ridged))
}

fn clamp_to_bounds(coeffs: &mut [f64], constraints: &[CoefficientBound]) {
    for constraint in constraints {
        constraint.clamp(coeffs);
    }
}
