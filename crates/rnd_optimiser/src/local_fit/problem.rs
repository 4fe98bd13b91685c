//! Assembly of the per-point weighted design.
//!
//! A [`LocalFitProblem`] is transient: built for one (strike, bandwidth)
//! evaluation, solved once, and dropped. The design is a polynomial in the
//! strike offset `d = K - K0`, weighted by the Gaussian kernel of the
//! side's bandwidth times each quote's open interest.

use rnd_core::math::kernel::kernel_weight;
use rnd_core::types::{OptionSide, QuoteSide};

use super::constraints::{no_arbitrage_bounds, CoefficientBound};

/// Highest polynomial degree used when enough quotes are available.
const MAX_DEGREE: usize = 3;

/// One constrained weighted least-squares instance.
#[derive(Debug, Clone)]
pub struct LocalFitProblem {
    offsets: Vec<f64>,
    targets: Vec<f64>,
    weights: Vec<f64>,
    center: f64,
    bandwidth: f64,
    degree: usize,
    side: OptionSide,
}

impl LocalFitProblem {
    /// Build the leave-one-out problem for quote `exclude` of `quotes`.
    ///
    /// The evaluation point is the excluded quote's strike; the fit uses
    /// every other quote on the side. Returns `None` when no quotes
    /// remain after exclusion.
    pub fn leave_one_out(
        side: OptionSide,
        quotes: &QuoteSide,
        exclude: usize,
        bandwidth: f64,
    ) -> Option<Self> {
        let center = quotes.quotes().get(exclude)?.strike;
        Self::build(side, quotes, Some(exclude), center, bandwidth)
    }

    /// Build the fit problem at an arbitrary evaluation point using all
    /// quotes on the side.
    pub fn at_point(
        side: OptionSide,
        quotes: &QuoteSide,
        center: f64,
        bandwidth: f64,
    ) -> Option<Self> {
        Self::build(side, quotes, None, center, bandwidth)
    }

    fn build(
        side: OptionSide,
        quotes: &QuoteSide,
        skip: Option<usize>,
        center: f64,
        bandwidth: f64,
    ) -> Option<Self> {
        let mut offsets = Vec::with_capacity(quotes.len());
        let mut targets = Vec::with_capacity(quotes.len());
        let mut weights = Vec::with_capacity(quotes.len());
        for (index, quote) in quotes.quotes().iter().enumerate() {
            if Some(index) == skip {
                continue;
            }
            let offset = quote.strike - center;
            offsets.push(offset);
            targets.push(quote.price);
            weights.push(quote.weight * kernel_weight(offset, bandwidth));
        }
        if offsets.is_empty() {
            return None;
        }
        let degree = MAX_DEGREE.min(offsets.len() - 1);
        Some(Self {
            offsets,
            targets,
            weights,
            center,
            bandwidth,
            degree,
            side,
        })
    }

    /// Polynomial degree of this fit.
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Number of fitted coefficients (`degree + 1`).
    pub fn n_coefficients(&self) -> usize {
        self.degree + 1
    }

    /// Number of observations in the design.
    pub fn n_observations(&self) -> usize {
        self.offsets.len()
    }

    /// The evaluation point (strike offset origin).
    pub fn center(&self) -> f64 {
        self.center
    }

    /// The smoothing bandwidth used for the kernel weights.
    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// The option side this fit belongs to.
    pub fn side(&self) -> OptionSide {
        self.side
    }

    /// The no-arbitrage bounds applicable to this fit.
    pub fn constraints(&self) -> Vec<CoefficientBound> {
        no_arbitrage_bounds(self.side, self.degree)
    }

    /// Assemble the weighted normal equations `(X^T W X, X^T W y)`.
    pub fn normal_equations(&self) -> (Vec<Vec<f64>>, Vec<f64>) {
        let p = self.n_coefficients();
        let mut ata = vec![vec![0.0; p]; p];
        let mut atb = vec![0.0; p];
        let mut powers = vec![0.0; p];
        for ((&offset, &target), &weight) in self
            .offsets
            .iter()
            .zip(&self.targets)
            .zip(&self.weights)
        {
            powers[0] = 1.0;
            for i in 1..p {
                powers[i] = powers[i - 1] * offset;
            }
            for i in 0..p {
                let wp = weight * powers[i];
                for j in 0..p {
                    ata[i][j] += wp * powers[j];
                }
                atb[i] += wp * target;
            }
        }
        (ata, atb)
    }

    /// Weighted sum of squared residuals at `coeffs`.
    pub fn weighted_sse(&self, coeffs: &[f64]) -> f64 {
        self.offsets
            .iter()
            .zip(&self.targets)
            .zip(&self.weights)
            .map(|((&offset, &target), &weight)| {
                let mut fitted = 0.0;
                let mut power = 1.0;
                for &c in coeffs {
                    fitted += c * power;
                    power *= offset;
                }
                let residual = target - fitted;
                weight * residual * residual
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rnd_core::types::QuoteSide;

    fn five_quotes() -> QuoteSide {
        QuoteSide::new(
            vec![90.0, 95.0, 100.0, 105.0, 110.0],
            vec![12.0, 8.5, 5.5, 3.2, 1.8],
            vec![1.0, 2.0, 4.0, 2.0, 1.0],
        )
        .unwrap()
    }

    #[test]
    fn test_leave_one_out_excludes_center() {
        let quotes = five_quotes();
        let problem =
            LocalFitProblem::leave_one_out(OptionSide::Call, &quotes, 2, 5.0).unwrap();
        assert_eq!(problem.n_observations(), 4);
        assert_eq!(problem.center(), 100.0);
        assert_eq!(problem.degree(), 3);
        // The held-out strike's zero offset must not appear
        assert!(problem.offsets.iter().all(|&d| d != 0.0));
    }

    #[test]
    fn test_degree_shrinks_with_few_quotes() {
        let quotes = QuoteSide::new(
            vec![95.0, 100.0, 105.0],
            vec![8.5, 5.5, 3.2],
            vec![1.0, 1.0, 1.0],
        )
        .unwrap();
        let problem =
            LocalFitProblem::leave_one_out(OptionSide::Call, &quotes, 1, 5.0).unwrap();
        // Two remaining quotes support a linear fit only
        assert_eq!(problem.degree(), 1);
        assert_eq!(problem.n_coefficients(), 2);
    }

    #[test]
    fn test_single_remaining_quote_is_constant_fit() {
        let quotes = QuoteSide::new(vec![95.0, 100.0], vec![8.5, 5.5], vec![1.0, 1.0]).unwrap();
        let problem =
            LocalFitProblem::leave_one_out(OptionSide::Put, &quotes, 0, 2.0).unwrap();
        assert_eq!(problem.degree(), 0);
    }

    #[test]
    fn test_no_remaining_quote_returns_none() {
        let quotes = QuoteSide::new(vec![100.0], vec![5.5], vec![1.0]).unwrap();
        assert!(LocalFitProblem::leave_one_out(OptionSide::Call, &quotes, 0, 2.0).is_none());
    }

    #[test]
    fn test_out_of_range_exclude_returns_none() {
        let quotes = five_quotes();
        assert!(LocalFitProblem::leave_one_out(OptionSide::Call, &quotes, 9, 2.0).is_none());
    }

    #[test]
    fn test_at_point_uses_all_quotes() {
        let quotes = five_quotes();
        let problem =
            LocalFitProblem::at_point(OptionSide::Call, &quotes, 102.5, 5.0).unwrap();
        assert_eq!(problem.n_observations(), 5);
        assert_eq!(problem.center(), 102.5);
    }

    #[test]
    fn test_normal_equations_symmetry() {
        let quotes = five_quotes();
        let problem =
            LocalFitProblem::leave_one_out(OptionSide::Call, &quotes, 2, 5.0).unwrap();
        let (ata, _) = problem.normal_equations();
        let p = problem.n_coefficients();
        for i in 0..p {
            for j in 0..p {
                assert_relative_eq!(ata[i][j], ata[j][i], max_relative = 1e-12);
            }
        }
    }

    #[test]
    fn test_normal_equations_constant_fit() {
        // Degree-0 fit: the normal equations reduce to the weighted mean
        let quotes = QuoteSide::new(vec![95.0, 100.0], vec![8.0, 6.0], vec![1.0, 1.0]).unwrap();
        let problem =
            LocalFitProblem::leave_one_out(OptionSide::Call, &quotes, 0, 100.0).unwrap();
        let (ata, atb) = problem.normal_equations();
        let mean = atb[0] / ata[0][0];
        assert_relative_eq!(mean, 6.0, max_relative = 1e-12);
    }

    #[test]
    fn test_weighted_sse_zero_at_exact_fit() {
        // Targets generated from a known quadratic
        let quotes = QuoteSide::new(
            vec![98.0, 99.0, 101.0, 102.0],
            vec![4.0 + 4.0, 4.0 + 1.0, 4.0 + 1.0, 4.0 + 4.0],
            vec![1.0, 1.0, 1.0, 1.0],
        )
        .unwrap();
        let problem =
            LocalFitProblem::at_point(OptionSide::Call, &quotes, 100.0, 3.0).unwrap();
        // price = 4 + d^2
        let sse = problem.weighted_sse(&[4.0, 0.0, 1.0, 0.0]);
        assert!(sse < 1e-18);
    }

    #[test]
    fn test_kernel_localises_weights() {
        let quotes = five_quotes();
        let problem =
            LocalFitProblem::leave_one_out(OptionSide::Call, &quotes, 2, 1.0).unwrap();
        // With h = 1 the +-5 neighbours carry next to no weight
        assert!(problem.weights.iter().all(|&w| w < 1e-5));
    }
}
