//! Calibrate command implementation.
//!
//! Loads quote files, runs the bandwidth search in `rnd_optimiser`, and
//! reports the optimum.

use std::fs;
use std::path::Path;

use tracing::info;

use rnd_optimiser::config::BandwidthSearchConfig;
use rnd_optimiser::search::AdaptiveBandwidthOptimizer;

use crate::{loader, CliError, Result};

/// Arguments of the calibrate command.
pub struct CalibrateArgs {
    /// Directory of quote files.
    pub data_dir: String,
    /// Grid resolution per search stage.
    pub grid_size: usize,
    /// Call-side range lower bound.
    pub hc_min: f64,
    /// Call-side range upper bound.
    pub hc_max: f64,
    /// Put-side range lower bound.
    pub hp_min: f64,
    /// Put-side range upper bound.
    pub hp_max: f64,
    /// Evaluate the full grid once instead of coarse-to-fine.
    pub full: bool,
    /// Optional JSON output path.
    pub output: Option<String>,
}

/// Run the calibrate command.
pub fn run(args: CalibrateArgs) -> Result<()> {
    info!("Loading market data from {}", args.data_dir);
    let loaded = loader::load_market(Path::new(&args.data_dir))?;
    info!(
        "  {} call quotes, {} put quotes, {} support points",
        loaded.market.calls().len(),
        loaded.market.puts().len(),
        loaded.grid.len()
    );

    let config = BandwidthSearchConfig::builder()
        .hc_range(args.hc_min, args.hc_max)
        .hp_range(args.hp_min, args.hp_max)
        .grid_size(args.grid_size)
        .build();

    let optimiser = AdaptiveBandwidthOptimizer::new(&loaded.market, &loaded.grid, config)?;

    info!(
        "Running {} search at {}x{} resolution",
        if args.full { "full-grid" } else { "adaptive" },
        args.grid_size,
        args.grid_size
    );
    let result = if args.full {
        optimiser.full_search()?
    } else {
        optimiser.run()?
    };

    super::report(&result);

    if let Some(output_path) = args.output {
        info!("Writing result to {}", output_path);
        let json = serde_json::to_string_pretty(&result)?;
        fs::write(&output_path, json).map_err(|source| CliError::Io {
            path: output_path,
            source,
        })?;
    }

    Ok(())
}
