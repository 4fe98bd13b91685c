//! No-arbitrage coefficient bounds for local fits.
//!
//! The local polynomial is written in powers of the strike offset
//! `d = K - K0`, so its coefficients are the fitted price curve's value,
//! slope, and half-curvature at the evaluation point. No-arbitrage of the
//! price curve pins each of them to a bound:
//!
//! - `b0 >= 0`: option prices are non-negative;
//! - calls: `-1 <= b1 <= 0`; puts: `0 <= b1 <= 1` (the slope of the price
//!   curve in strike is a discounted CDF term);
//! - `b2 >= 0`: convexity, equivalently a non-negative implied density at
//!   the evaluation point.
//!
//! The cubic coefficient is unconstrained. Every constraint is a bound on
//! a single coefficient, so the active-set solver can enforce it by
//! pinning that coefficient and re-solving the reduced system, which
//! stays symmetric positive-definite.

use rnd_core::types::OptionSide;

/// Which side of a bound a constraint enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundKind {
    /// The coefficient must be >= the bound.
    Lower,
    /// The coefficient must be <= the bound.
    Upper,
}

/// A bound on one polynomial coefficient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoefficientBound {
    /// Index of the constrained coefficient.
    pub coefficient: usize,
    /// Bound direction.
    pub kind: BoundKind,
    /// Bound value.
    pub bound: f64,
}

impl CoefficientBound {
    /// A lower bound `coeffs[coefficient] >= bound`.
    pub fn lower(coefficient: usize, bound: f64) -> Self {
        Self {
            coefficient,
            kind: BoundKind::Lower,
            bound,
        }
    }

    /// An upper bound `coeffs[coefficient] <= bound`.
    pub fn upper(coefficient: usize, bound: f64) -> Self {
        Self {
            coefficient,
            kind: BoundKind::Upper,
            bound,
        }
    }

    /// Violation magnitude at `coeffs`, zero when satisfied.
    ///
    /// A constraint on a coefficient beyond the polynomial degree is
    /// vacuously satisfied.
    pub fn violation(&self, coeffs: &[f64]) -> f64 {
        let Some(&value) = coeffs.get(self.coefficient) else {
            return 0.0;
        };
        match self.kind {
            BoundKind::Lower => (self.bound - value).max(0.0),
            BoundKind::Upper => (value - self.bound).max(0.0),
        }
    }

    /// Clamp `coeffs` in place so this bound holds.
    pub fn clamp(&self, coeffs: &mut [f64]) {
        if let Some(value) = coeffs.get_mut(self.coefficient) {
            match self.kind {
                BoundKind::Lower => *value = value.max(self.bound),
                BoundKind::Upper => *value = value.min(self.bound),
            }
        }
    }
}

/// The no-arbitrage bounds for a side and polynomial degree.
pub fn no_arbitrage_bounds(side: OptionSide, degree: usize) -> Vec<CoefficientBound> {
    let mut bounds = vec![CoefficientBound::lower(0, 0.0)];
    if degree >= 1 {
        match side {
            OptionSide::Call => {
                bounds.push(CoefficientBound::upper(1, 0.0));
                bounds.push(CoefficientBound::lower(1, -1.0));
            }
            OptionSide::Put => {
                bounds.push(CoefficientBound::lower(1, 0.0));
                bounds.push(CoefficientBound::upper(1, 1.0));
            }
        }
    }
    if degree >= 2 {
        bounds.push(CoefficientBound::lower(2, 0.0));
    }
    bounds
}
