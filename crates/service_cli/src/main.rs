//! nprnd CLI - Bandwidth calibration for nonparametric RND estimation
//!
//! This is the operational entry point for the estimator workspace.
//!
//! # Commands
//!
//! - `nprnd calibrate --data-dir <dir> [GRID_SIZE]` - Calibrate (hc, hp)
//!   from option quote files
//! - `nprnd demo [GRID_SIZE]` - Run the search on a synthetic
//!   Black-Scholes market
//!
//! # Architecture
//!
//! The service layer: loads quote files, configures the optimiser in
//! `rnd_optimiser`, and reports results. No algorithmic content lives
//! here.

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod error;
mod loader;

pub use error::{CliError, Result};

/// Nonparametric RND bandwidth calibration CLI
#[derive(Parser)]
#[command(name = "nprnd")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calibrate smoothing bandwidths from option quote files
    Calibrate {
        /// Directory containing the quote files (one numeric value per
        /// line): call_prices.txt, call_strikes.txt,
        /// call_open_interest.txt, put_prices.txt, put_strikes.txt,
        /// put_open_interest.txt, strikes.txt
        #[arg(short, long)]
        data_dir: String,

        /// Grid resolution per search stage
        #[arg(default_value_t = 32)]
        grid_size: usize,

        /// Lower bound of the call-side bandwidth range
        #[arg(long, default_value_t = 0.25)]
        hc_min: f64,

        /// Upper bound of the call-side bandwidth range
        #[arg(long, default_value_t = 5.0)]
        hc_max: f64,

        /// Lower bound of the put-side bandwidth range
        #[arg(long, default_value_t = 0.25)]
        hp_min: f64,

        /// Upper bound of the put-side bandwidth range
        #[arg(long, default_value_t = 5.0)]
        hp_max: f64,

        /// Evaluate the full grid once instead of the coarse-to-fine
        /// search
        #[arg(long)]
        full: bool,

        /// Write the search result as JSON to this file
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Run the search on a synthetic Black-Scholes market
    Demo {
        /// Grid resolution per search stage
        #[arg(default_value_t = 16)]
        grid_size: usize,
    },
}

fn main() -> Result<()> {
    // Initialise tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    match cli.command {
        Commands::Calibrate {
            data_dir,
            grid_size,
            hc_min,
            hc_max,
            hp_min,
            hp_max,
            full,
            output,
        } => commands::calibrate::run(commands::calibrate::CalibrateArgs {
            data_dir,
            grid_size,
            hc_min,
            hc_max,
            hp_min,
            hp_max,
            full,
            output,
        }),
        Commands::Demo { grid_size } => commands::demo::run(grid_size),
    }
}
