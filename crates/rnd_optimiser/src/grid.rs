//! Parallel evaluation of the CV objective over a 2-D bandwidth grid.
//!
//! The M x K index space is partitioned dynamically in small chunks across
//! Rayon's work-stealing pool: per-cell QP iteration counts vary, so small
//! chunks balance load far better than static row blocks. Each cell writes
//! its own disjoint matrix entry; the only synchronisation is the implicit
//! fork-join barrier at the end of the loop. Per-worker counter totals are
//! folded locally and merged once into the shared [`GridStats`] atomics.

use std::sync::atomic::{AtomicUsize, Ordering};

use rnd_core::types::{BandwidthPair, InputError, ResourceError};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::cv::{CrossValidationEvaluator, CvOutcome};
use crate::EstimatorError;

/// Maximum cells per work-stealing chunk.
///
/// Kept small so a slow cell (many active-set iterations) cannot strand a
/// long tail of work on one thread.
const CELL_CHUNK: usize = 4;

/// Process-wide evaluation counters.
///
/// Updated with relaxed atomic adds; totals are exact because every
/// update is an associative, commutative increment merged at stage end.
#[derive(Debug, Default)]
pub struct GridStats {
    cells_evaluated: AtomicUsize,
    problems_solved: AtomicUsize,
    solver_iterations: AtomicUsize,
    degraded_fits: AtomicUsize,
}

/// A point-in-time copy of [`GridStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridStatsSnapshot {
    /// Grid cells evaluated.
    pub cells_evaluated: usize,
    /// QP problems solved.
    pub problems_solved: usize,
    /// Total active-set iterations.
    pub solver_iterations: usize,
    /// QP solves flagged degraded.
    pub degraded_fits: usize,
}

impl GridStats {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the current totals.
    pub fn snapshot(&self) -> GridStatsSnapshot {
        GridStatsSnapshot {
            cells_evaluated: self.cells_evaluated.load(Ordering::Relaxed),
            problems_solved: self.problems_solved.load(Ordering::Relaxed),
            solver_iterations: self.solver_iterations.load(Ordering::Relaxed),
            degraded_fits: self.degraded_fits.load(Ordering::Relaxed),
        }
    }

    fn add(&self, totals: &CellTotals) {
        self.cells_evaluated.fetch_add(totals.cells, Ordering::Relaxed);
        self.problems_solved
            .fetch_add(totals.problems, Ordering::Relaxed);
        self.solver_iterations
            .fetch_add(totals.iterations, Ordering::Relaxed);
        self.degraded_fits
            .fetch_add(totals.degraded, Ordering::Relaxed);
    }
}

/// Per-worker counter accumulator, merged commutatively at stage end.
#[derive(Debug, Clone, Copy, Default)]
struct CellTotals {
    cells: usize,
    problems: usize,
    iterations: usize,
    degraded: usize,
}

impl CellTotals {
    fn absorb(&mut self, outcome: &CvOutcome) {
        self.cells += 1;
        self.problems += outcome.problems_solved;
        self.iterations += outcome.solver_iterations;
        self.degraded += outcome.degraded_fits;
    }

    fn merge(self, other: Self) -> Self {
        Self {
            cells: self.cells + other.cells,
            problems: self.problems + other.problems,
            iterations: self.iterations + other.iterations,
            degraded: self.degraded + other.degraded,
        }
    }
}

/// Row-major objective matrix for one grid stage.
///
/// Rows index `hc_values`, columns index `hp_values`. Unevaluated or
/// infeasible cells hold `f64::INFINITY`. The buffer is owned by the
/// stage and dropped with it.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectiveMatrix {
    values: Vec<f64>,
    n_rows: usize,
    n_cols: usize,
}

impl ObjectiveMatrix {
    /// Allocate an infinity-filled matrix, surfacing allocation failure
    /// as a [`ResourceError`] instead of aborting.
    fn allocate(n_rows: usize, n_cols: usize) -> Result<Self, ResourceError> {
        let cells = n_rows * n_cols;
        let mut values = Vec::new();
        values
            .try_reserve_exact(cells)
            .map_err(|_| ResourceError::AllocationFailed { cells })?;
        values.resize(cells, f64::INFINITY);
        Ok(Self {
            values,
            n_rows,
            n_cols,
        })
    }

    /// Number of rows (hc candidates).
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns (hp candidates).
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// The objective at cell `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.n_cols + col]
    }

    /// The raw row-major cell values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Index and value of the minimum finite cell.
    ///
    /// Scans in row-major order; ties break to the first occurrence.
    /// Returns `None` when every cell is infeasible.
    pub fn argmin(&self) -> Option<(usize, usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, &value) in self.values.iter().enumerate() {
            if value.is_finite() && best.map_or(true, |(_, b)| value < b) {
                best = Some((idx, value));
            }
        }
        best.map(|(idx, value)| (idx / self.n_cols, idx % self.n_cols, value))
    }
}

/// Maps a [`CrossValidationEvaluator`] over the Cartesian product of two
/// bandwidth arrays.
#[derive(Debug, Clone)]
pub struct GridEvaluator<'a> {
    evaluator: CrossValidationEvaluator<'a>,
}

impl<'a> GridEvaluator<'a> {
    /// Wrap a cross-validation evaluator.
    pub fn new(evaluator: CrossValidationEvaluator<'a>) -> Self {
        Self { evaluator }
    }

    /// Fill the objective matrix for `hc_values` x `hp_values` in
    /// parallel.
    ///
    /// Cell `(i, j)` holds exactly the value of
    /// `evaluate(hc_values[i], hp_values[j])` regardless of execution
    /// order or thread count. Counters accumulate into `stats`.
    #[cfg(feature = "parallel")]
    pub fn evaluate(
        &self,
        hc_values: &[f64],
        hp_values: &[f64],
        stats: &GridStats,
    ) -> Result<ObjectiveMatrix, EstimatorError> {
        validate_axis("hc", hc_values)?;
        validate_axis("hp", hp_values)?;
        let mut matrix = ObjectiveMatrix::allocate(hc_values.len(), hp_values.len())?;
        let n_cols = hp_values.len();

        let totals = matrix
            .values
            .par_iter_mut()
            .enumerate()
            .with_max_len(CELL_CHUNK)
            .fold(CellTotals::default, |mut acc, (idx, slot)| {
                let outcome = self.cell(idx, n_cols, hc_values, hp_values);
                *slot = outcome.objective;
                acc.absorb(&outcome);
                acc
            })
            .reduce(CellTotals::default, CellTotals::merge);

        stats.add(&totals);
        Ok(matrix)
    }

    /// Sequential fallback when the `parallel` feature is disabled.
    #[cfg(not(feature = "parallel"))]
    pub fn evaluate(
        &self,
        hc_values: &[f64],
        hp_values: &[f64],
        stats: &GridStats,
    ) -> Result<ObjectiveMatrix, EstimatorError> {
        self.evaluate_sequential(hc_values, hp_values, stats)
    }

    /// Fill the objective matrix on the calling thread.
    ///
    /// Exists for determinism testing (parallel results must match) and
    /// as the non-parallel build's implementation.
    pub fn evaluate_sequential(
        &self,
        hc_values: &[f64],
        hp_values: &[f64],
        stats: &GridStats,
    ) -> Result<ObjectiveMatrix, EstimatorError> {
        validate_axis("hc", hc_values)?;
        validate_axis("hp", hp_values)?;
        let mut matrix = ObjectiveMatrix::allocate(hc_values.len(), hp_values.len())?;
        let n_cols = hp_values.len();

        let mut totals = CellTotals::default();
        for (idx, slot) in matrix.values.iter_mut().enumerate() {
            let outcome = self.cell(idx, n_cols, hc_values, hp_values);
            *slot = outcome.objective;
            totals.absorb(&outcome);
        }

        stats.add(&totals);
        Ok(matrix)
    }

    /// Evaluate one cell of the row-major index space.
    fn cell(&self, idx: usize, n_cols: usize, hc_values: &[f64], hp_values: &[f64]) -> CvOutcome {
        let bandwidths = BandwidthPair {
            hc: hc_values[idx / n_cols],
            hp: hp_values[idx % n_cols],
        };
        self.evaluator.evaluate(bandwidths)
    }
}

/// Reject empty, non-positive, or non-increasing bandwidth arrays.
fn validate_axis(axis: &'static str, values: &[f64]) -> Result<(), InputError> {
    let Some(&first) = values.first() else {
        return Err(InputError::InsufficientPoints { got: 0, need: 1 });
    };
    if !(first.is_finite() && first > 0.0) {
        return Err(InputError::NonPositiveBandwidth { value: first });
    }
    for pair in values.windows(2) {
        if !pair[1].is_finite() || pair[1] <= pair[0] {
            return Err(InputError::InvalidBandwidthRange {
                axis,
                min: pair[0],
                max: pair[1],
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BandwidthSearchConfig;
    use rnd_core::math::linspace;
    use rnd_core::types::{MarketQuotes, QuoteSide, UnderlyingGrid};

    fn market() -> MarketQuotes {
        let strikes: Vec<f64> = (0..9).map(|i| 92.0 + 2.0 * i as f64).collect();
        let call_prices: Vec<f64> = strikes
            .iter()
            .map(|k| 15.0 * (-(k - 85.0) / 15.0).exp())
            .collect();
        let put_prices: Vec<f64> = strikes
            .iter()
            .map(|k| 15.0 * ((k - 115.0) / 15.0).exp())
            .collect();
        let weights = vec![1.0; strikes.len()];
        MarketQuotes::new(
            QuoteSide::new(strikes.clone(), call_prices, weights.clone()).unwrap(),
            QuoteSide::new(strikes, put_prices, weights).unwrap(),
        )
    }

    #[test]
    fn test_matrix_argmin_row_major_tie_break() {
        let mut matrix = ObjectiveMatrix::allocate(2, 2).unwrap();
        matrix.values = vec![3.0, 1.0, 1.0, 2.0];
        // Both 1.0 cells tie; the first in row-major order wins
        assert_eq!(matrix.argmin(), Some((0, 1, 1.0)));
    }

    #[test]
    fn test_matrix_argmin_ignores_infeasible() {
        let mut matrix = ObjectiveMatrix::allocate(2, 2).unwrap();
        matrix.values = vec![f64::INFINITY, f64::INFINITY, 5.0, f64::INFINITY];
        assert_eq!(matrix.argmin(), Some((1, 0, 5.0)));
    }

    #[test]
    fn test_matrix_argmin_all_infeasible() {
        let matrix = ObjectiveMatrix::allocate(3, 3).unwrap();
        assert_eq!(matrix.argmin(), None);
    }

    #[test]
    fn test_grid_matches_direct_evaluation() {
        let market = market();
        let grid = UnderlyingGrid::from_range(85.0, 115.0, 61).unwrap();
        let config = BandwidthSearchConfig::default();
        let evaluator = CrossValidationEvaluator::new(&market, &grid, &config);
        let grid_eval = GridEvaluator::new(evaluator.clone());

        let hc = linspace(1.0, 3.0, 4);
        let hp = linspace(1.5, 2.5, 3);
        let stats = GridStats::new();
        let matrix = grid_eval.evaluate(&hc, &hp, &stats).unwrap();

        assert_eq!(matrix.n_rows(), 4);
        assert_eq!(matrix.n_cols(), 3);
        for (i, &hc_value) in hc.iter().enumerate() {
            for (j, &hp_value) in hp.iter().enumerate() {
                let direct = evaluator.evaluate(BandwidthPair {
                    hc: hc_value,
                    hp: hp_value,
                });
                assert_eq!(
                    matrix.get(i, j).to_bits(),
                    direct.objective.to_bits(),
                    "cell ({}, {}) must equal the direct evaluation",
                    i,
                    j
                );
            }
        }
    }

    #[test]
    fn test_parallel_equals_sequential() {
        let market = market();
        let grid = UnderlyingGrid::from_range(85.0, 115.0, 61).unwrap();
        let config = BandwidthSearchConfig::default();
        let evaluator = CrossValidationEvaluator::new(&market, &grid, &config);
        let grid_eval = GridEvaluator::new(evaluator);

        let hc = linspace(0.75, 2.0, 5);
        let hp = linspace(0.75, 2.0, 5);

        let par_stats = GridStats::new();
        let parallel = grid_eval.evaluate(&hc, &hp, &par_stats).unwrap();
        let seq_stats = GridStats::new();
        let sequential = grid_eval.evaluate_sequential(&hc, &hp, &seq_stats).unwrap();

        assert_eq!(parallel, sequential);
        assert_eq!(par_stats.snapshot(), seq_stats.snapshot());
    }

    #[test]
    fn test_stats_accumulate_across_stages() {
        let market = market();
        let grid = UnderlyingGrid::from_range(85.0, 115.0, 61).unwrap();
        let config = BandwidthSearchConfig::default();
        let evaluator = CrossValidationEvaluator::new(&market, &grid, &config);
        let grid_eval = GridEvaluator::new(evaluator);

        let hc = linspace(1.0, 2.0, 3);
        let hp = linspace(1.0, 2.0, 3);
        let stats = GridStats::new();
        grid_eval.evaluate(&hc, &hp, &stats).unwrap();
        grid_eval.evaluate(&hc, &hp, &stats).unwrap();

        let snap = stats.snapshot();
        assert_eq!(snap.cells_evaluated, 18);
        // 18 quotes per cell (9 strikes per side)
        assert_eq!(snap.problems_solved, 18 * 18);
    }

    #[test]
    fn test_rejects_non_increasing_axis() {
        let market = market();
        let grid = UnderlyingGrid::from_range(85.0, 115.0, 61).unwrap();
        let config = BandwidthSearchConfig::default();
        let evaluator = CrossValidationEvaluator::new(&market, &grid, &config);
        let grid_eval = GridEvaluator::new(evaluator);

        let stats = GridStats::new();
        let err = grid_eval
            .evaluate(&[1.0, 1.0], &[1.0, 2.0], &stats)
            .unwrap_err();
        assert!(matches!(err, EstimatorError::Input(_)));
    }

    #[test]
    fn test_rejects_non_positive_axis() {
        let market = market();
        let grid = UnderlyingGrid::from_range(85.0, 115.0, 61).unwrap();
        let config = BandwidthSearchConfig::default();
        let evaluator = CrossValidationEvaluator::new(&market, &grid, &config);
        let grid_eval = GridEvaluator::new(evaluator);

        let stats = GridStats::new();
        assert!(grid_eval
            .evaluate(&[0.0, 1.0], &[1.0, 2.0], &stats)
            .is_err());
    }
}
