//! Command implementations.

pub mod calibrate;
pub mod demo;

use rnd_optimiser::search::BandwidthSearchResult;

/// Report a search result on standard output.
///
/// The `hc:` / `hp:` / `[bandwidth_grid_total]` lines are the stable
/// machine-readable surface external tooling parses.
pub(crate) fn report(result: &BandwidthSearchResult) {
    println!("Optimal bandwidths:");
    println!("  hc: {:.6}", result.bandwidths.hc);
    println!("  hp: {:.6}", result.bandwidths.hp);
    println!("  objective: {:.6e}", result.objective);
    println!("QP problems solved: {}", result.problems_solved);
    println!("Total solver iterations: {}", result.solver_iterations);
    println!("Degraded fits: {}", result.degraded_fits);
    println!("Cells evaluated: {}", result.cells_evaluated);
    println!("Workers: {}", num_cpus::get());
    println!(
        "[bandwidth_grid_total] {:.3} s",
        result.duration.as_secs_f64()
    );
}
