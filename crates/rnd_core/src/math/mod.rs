//! Numerical building blocks.
//!
//! This module provides:
//! - `linalg`: Dense SPD solves with near-singularity detection and ridge
//!   regularisation
//! - `kernel`: Gaussian smoothing kernel and normal distribution functions
//! - [`linspace`]: Evenly spaced sample points over a closed interval

pub mod kernel;
pub mod linalg;

/// Evenly spaced sample points over `[start, end]`, endpoints included.
///
/// Returns an empty vector for `num == 0` and `vec![start]` for `num == 1`.
///
/// # Examples
/// ```
/// use rnd_core::math::linspace;
///
/// let xs = linspace(0.0, 2.0, 5);
/// assert_eq!(xs, vec![0.0, 0.5, 1.0, 1.5, 2.0]);
/// ```
pub fn linspace(start: f64, end: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (num - 1) as f64;
            (0..num).map(|i| start + i as f64 * step).collect()
        }
    }
}
