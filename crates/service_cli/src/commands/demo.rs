//! Demo command implementation.
//!
//! Builds a synthetic Black-Scholes market (spot 100, vol 20%, half a
//! year, zero rates) and runs the adaptive search on it. Useful for
//! exercising the pipeline without quote files.

use tracing::info;

use rnd_core::math::kernel::norm_cdf;
use rnd_core::math::linspace;
use rnd_core::types::{MarketQuotes, QuoteSide, UnderlyingGrid};
use rnd_optimiser::config::BandwidthSearchConfig;
use rnd_optimiser::search::AdaptiveBandwidthOptimizer;

use crate::Result;

/// Black-Scholes call price with zero rates.
fn black_scholes_call(s: f64, k: f64, sigma: f64, t: f64) -> f64 {
    let vol = sigma * t.sqrt();
    let d1 = ((s / k).ln() + 0.5 * vol * vol) / vol;
    let d2 = d1 - vol;
    s * norm_cdf(d1) - k * norm_cdf(d2)
}

/// Synthetic quote set: 25 strikes per side, open interest peaked at the
/// money.
fn synthetic_market() -> Result<MarketQuotes> {
    let (s, sigma, t) = (100.0, 0.2, 0.5);
    let strikes = linspace(76.0, 124.0, 25);
    let call_prices: Vec<f64> = strikes
        .iter()
        .map(|&k| black_scholes_call(s, k, sigma, t))
        .collect();
    // Zero-rate put-call parity: P = C - S + K
    let put_prices: Vec<f64> = strikes
        .iter()
        .zip(&call_prices)
        .map(|(&k, &c)| c - s + k)
        .collect();
    let weights: Vec<f64> = strikes
        .iter()
        .map(|&k| 100.0 * (-((k - s) / 20.0).powi(2)).exp())
        .collect();

    let calls = QuoteSide::new(strikes.clone(), call_prices, weights.clone())?;
    let puts = QuoteSide::new(strikes, put_prices, weights)?;
    Ok(MarketQuotes::new(calls, puts))
}

/// Run the demo command.
pub fn run(grid_size: usize) -> Result<()> {
    info!("Building synthetic Black-Scholes market");
    let market = synthetic_market()?;
    let grid = UnderlyingGrid::from_range(60.0, 140.0, 161)?;

    let config = BandwidthSearchConfig::builder()
        .hc_range(0.5, 8.0)
        .hp_range(0.5, 8.0)
        .grid_size(grid_size)
        .build();

    let optimiser = AdaptiveBandwidthOptimizer::new(&market, &grid, config)?;
    info!("Running adaptive search at {}x{} resolution", grid_size, grid_size);
    let result = optimiser.run()?;

    super::report(&result);
    Ok(())
}
