//! Quote-file loader.
//!
//! Input files hold one numeric value per line; blank lines are ignored.
//! The loader only reads and parses: array-shape validation (equal
//! lengths, distinct strikes, non-negative weights) belongs to the core
//! constructors.

use std::fs;
use std::path::Path;

use rnd_core::types::{MarketQuotes, QuoteSide, UnderlyingGrid};

use crate::{CliError, Result};

/// The parsed inputs for one calibration run.
#[derive(Debug)]
pub struct LoadedMarket {
    /// Call and put quotes.
    pub market: MarketQuotes,
    /// Evaluation support from the unique-strikes file.
    pub grid: UnderlyingGrid,
}

/// Load a market from a directory of one-value-per-line files.
pub fn load_market(dir: &Path) -> Result<LoadedMarket> {
    let calls = QuoteSide::new(
        read_column(dir, "call_strikes.txt")?,
        read_column(dir, "call_prices.txt")?,
        read_column(dir, "call_open_interest.txt")?,
    )?;
    let puts = QuoteSide::new(
        read_column(dir, "put_strikes.txt")?,
        read_column(dir, "put_prices.txt")?,
        read_column(dir, "put_open_interest.txt")?,
    )?;

    // The strikes file is unordered on disk; the grid requires strictly
    // increasing support and rejects duplicates itself
    let mut support = read_column(dir, "strikes.txt")?;
    support.sort_by(|a, b| a.total_cmp(b));
    let grid = UnderlyingGrid::new(support)?;

    Ok(LoadedMarket {
        market: MarketQuotes::new(calls, puts),
        grid,
    })
}

/// Read one numeric column file.
fn read_column(dir: &Path, name: &str) -> Result<Vec<f64>> {
    let path = dir.join(name);
    if !path.exists() {
        return Err(CliError::FileNotFound(path.display().to_string()));
    }
    let content = fs::read_to_string(&path).map_err(|source| CliError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let mut values = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let value: f64 = trimmed.parse().map_err(|_| CliError::Parse {
            path: path.display().to_string(),
            line: index + 1,
            value: trimmed.to_string(),
        })?;
        values.push(value);
    }
    Ok(values)
}
