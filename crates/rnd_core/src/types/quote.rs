//! Option quote data.
//!
//! Market inputs for the density estimator: one [`QuoteSide`] per option
//! side holding strike/price/open-interest triples, combined into
//! [`MarketQuotes`]. Sides are validated and sorted by strike on
//! construction and are read-only for the duration of a run.

use crate::types::error::InputError;

/// One observed option quote.
///
/// The weight is the quote's open interest and scales its contribution to
/// every local fit it participates in.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptionQuote {
    /// Strike price.
    pub strike: f64,
    /// Observed option price.
    pub price: f64,
    /// Open-interest weight, non-negative.
    pub weight: f64,
}

/// Which side of the option market a quote set belongs to.
///
/// Selects the smoothing bandwidth (hc for calls, hp for puts) and the
/// no-arbitrage slope bounds applied during local fitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OptionSide {
    /// Call options: price decreasing and convex in strike.
    Call,
    /// Put options: price increasing and convex in strike.
    Put,
}

impl OptionSide {
    /// Human-readable side label for diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            OptionSide::Call => "call",
            OptionSide::Put => "put",
        }
    }
}

/// Validated quotes for one option side, sorted by strike.
///
/// Construction enforces the boundary invariants: parallel arrays of equal
/// length, finite values, non-negative weights, and distinct strikes.
///
/// # Examples
/// ```
/// use rnd_core::types::QuoteSide;
///
/// let side = QuoteSide::new(
///     vec![95.0, 100.0, 105.0],
///     vec![7.2, 4.1, 2.0],
///     vec![10.0, 25.0, 5.0],
/// )
/// .unwrap();
/// assert_eq!(side.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuoteSide {
    quotes: Vec<OptionQuote>,
}

impl QuoteSide {
    /// Build a side from parallel strike/price/weight arrays.
    ///
    /// # Arguments
    ///
    /// * `strikes` - Strike prices, distinct within the side
    /// * `prices` - Observed option prices, same length as `strikes`
    /// * `weights` - Open-interest weights, same length, each >= 0
    ///
    /// # Returns
    ///
    /// * `Ok(QuoteSide)` - Quotes sorted by ascending strike
    /// * `Err(InputError)` - On any boundary-invariant violation
    pub fn new(
        strikes: Vec<f64>,
        prices: Vec<f64>,
        weights: Vec<f64>,
    ) -> Result<Self, InputError> {
        let n = strikes.len();
        if prices.len() != n {
            return Err(InputError::LengthMismatch {
                field: "prices",
                got: prices.len(),
                expected: n,
            });
        }
        if weights.len() != n {
            return Err(InputError::LengthMismatch {
                field: "weights",
                got: weights.len(),
                expected: n,
            });
        }

        for (index, &strike) in strikes.iter().enumerate() {
            if !strike.is_finite() {
                return Err(InputError::NonFinite {
                    field: "strikes",
                    index,
                });
            }
        }
        for (index, &price) in prices.iter().enumerate() {
            if !price.is_finite() {
                return Err(InputError::NonFinite {
                    field: "prices",
                    index,
                });
            }
        }
        for (index, &weight) in weights.iter().enumerate() {
            if !weight.is_finite() {
                return Err(InputError::NonFinite {
                    field: "weights",
                    index,
                });
            }
            if weight < 0.0 {
                return Err(InputError::NegativeWeight {
                    index,
                    value: weight,
                });
            }
        }

        let mut quotes: Vec<OptionQuote> = strikes
            .into_iter()
            .zip(prices)
            .zip(weights)
            .map(|((strike, price), weight)| OptionQuote {
                strike,
                price,
                weight,
            })
            .collect();
        quotes.sort_by(|a, b| a.strike.total_cmp(&b.strike));

        for pair in quotes.windows(2) {
            if pair[0].strike == pair[1].strike {
                return Err(InputError::DuplicateStrike {
                    strike: pair[0].strike,
                });
            }
        }

        Ok(Self { quotes })
    }

    /// Build a side from already-paired quotes.
    pub fn from_quotes(quotes: Vec<OptionQuote>) -> Result<Self, InputError> {
        let (strikes, rest): (Vec<f64>, Vec<(f64, f64)>) = quotes
            .iter()
            .map(|q| (q.strike, (q.price, q.weight)))
            .unzip();
        let (prices, weights) = rest.into_iter().unzip();
        Self::new(strikes, prices, weights)
    }

    /// The quotes, sorted by ascending strike.
    pub fn quotes(&self) -> &[OptionQuote] {
        &self.quotes
    }

    /// Number of quotes on this side.
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    /// Whether this side holds no quotes.
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Smallest and largest strike, if any quotes exist.
    pub fn strike_range(&self) -> Option<(f64, f64)> {
        match (self.quotes.first(), self.quotes.last()) {
            (Some(first), Some(last)) => Some((first.strike, last.strike)),
            _ => None,
        }
    }
}

/// The full quote set for a run: calls and puts.
///
/// Loaded once and shared read-only by all workers during grid evaluation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarketQuotes {
    calls: QuoteSide,
    puts: QuoteSide,
}

impl MarketQuotes {
    /// Combine validated call and put sides.
    pub fn new(calls: QuoteSide, puts: QuoteSide) -> Self {
        Self { calls, puts }
    }

    /// The call side.
    pub fn calls(&self) -> &QuoteSide {
        &self.calls
    }

    /// The put side.
    pub fn puts(&self) -> &QuoteSide {
        &self.puts
    }

    /// Select a side by tag.
    pub fn side(&self, side: OptionSide) -> &QuoteSide {
        match side {
            OptionSide::Call => &self.calls,
            OptionSide::Put => &self.puts,
        }
    }

    /// Total quote count across both sides.
    pub fn total_quotes(&self) -> usize {
        self.calls.len() + self.puts.len()
    }
}
