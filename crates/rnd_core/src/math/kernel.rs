//! Gaussian smoothing kernel and normal distribution functions.
//!
//! This module provides:
//! - `kernel_weight`: Gaussian kernel weight for a strike offset and bandwidth
//! - `norm_pdf` / `norm_cdf`: Standard normal density and distribution
//!
//! All functions are generic over `T: Float` to support both `f64` and
//! `f32`. The CDF uses the Abramowitz and Stegun erfc approximation
//! (formula 7.1.26, maximum error 1.5e-7), the same scheme analytic
//! pricing formulas rely on.

use num_traits::Float;

/// Square root of 2.
const SQRT_2: f64 = std::f64::consts::SQRT_2;

/// 1 / sqrt(2 * pi)
const FRAC_1_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

/// Complementary error function approximation using Horner's method.
///
/// Abramowitz and Stegun 7.1.26; maximum error 1.5e-7 for all x.
#[inline]
fn erfc_approx<T: Float>(x: T) -> T {
    let one = T::one();
    let zero = T::zero();

    let abs_x = x.abs();

    // Abramowitz and Stegun constants (7.1.26)
    let a1 = T::from(0.254829592).unwrap();
    let a2 = T::from(-0.284496736).unwrap();
    let a3 = T::from(1.421413741).unwrap();
    let a4 = T::from(-1.453152027).unwrap();
    let a5 = T::from(1.061405429).unwrap();
    let p = T::from(0.3275911).unwrap();

    let t = one / (one + p * abs_x);
    let poly = a1 + t * (a2 + t * (a3 + t * (a4 + t * a5)));
    let erfc_abs = t * poly * (-abs_x * abs_x).exp();

    // erfc(-x) = 2 - erfc(x)
    let two = T::from(2.0).unwrap();
    if x < zero {
        two - erfc_abs
    } else {
        erfc_abs
    }
}

/// Standard normal probability density function.
///
/// phi(x) = exp(-x^2 / 2) / sqrt(2 pi)
#[inline]
pub fn norm_pdf<T: Float>(x: T) -> T {
    let half = T::from(0.5).unwrap();
    let scale = T::from(FRAC_1_SQRT_2PI).unwrap();
    scale * (-half * x * x).exp()
}

/// Standard normal cumulative distribution function.
///
/// Computes P(X <= x) for X ~ N(0, 1) as 0.5 * erfc(-x / sqrt(2)).
/// Accurate to at least 1e-7 for all finite x.
///
/// # Examples
/// ```
/// use rnd_core::math::kernel::norm_cdf;
///
/// assert!((norm_cdf(0.0_f64) - 0.5).abs() < 1e-7);
/// assert!(norm_cdf(-3.0_f64) < 0.01);
/// assert!(norm_cdf(3.0_f64) > 0.99);
/// ```
#[inline]
pub fn norm_cdf<T: Float>(x: T) -> T {
    let sqrt_2 = T::from(SQRT_2).unwrap();
    let half = T::from(0.5).unwrap();
    half * erfc_approx(-x / sqrt_2)
}

/// Gaussian kernel weight for a quote at `distance` from the evaluation
/// point under smoothing bandwidth `bandwidth`.
///
/// Returns `phi(distance / bandwidth)`. The 1/h normalisation constant is
/// omitted: it scales every weight in a fit identically and cancels in the
/// weighted least-squares solution.
#[inline]
pub fn kernel_weight<T: Float>(distance: T, bandwidth: T) -> T {
    norm_pdf(distance / bandwidth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_norm_pdf_peak() {
        assert_relative_eq!(norm_pdf(0.0_f64), FRAC_1_SQRT_2PI, max_relative = 1e-12);
    }

    #[test]
    fn test_norm_pdf_symmetry() {
        assert_relative_eq!(norm_pdf(1.3_f64), norm_pdf(-1.3_f64), max_relative = 1e-12);
    }

    #[test]
    fn test_norm_cdf_midpoint() {
        assert!((norm_cdf(0.0_f64) - 0.5).abs() < 1e-7);
    }

    #[test]
    fn test_norm_cdf_known_values() {
        // Phi(1) = 0.841344746..., Phi(-1) = 0.158655254...
        assert!((norm_cdf(1.0_f64) - 0.8413447).abs() < 1e-6);
        assert!((norm_cdf(-1.0_f64) - 0.1586553).abs() < 1e-6);
    }

    #[test]
    fn test_norm_cdf_complement() {
        for x in [0.25_f64, 0.5, 1.0, 2.0, 3.5] {
            assert!((norm_cdf(x) + norm_cdf(-x) - 1.0).abs() < 1e-7);
        }
    }

    #[test]
    fn test_norm_cdf_monotone() {
        let mut prev = norm_cdf(-5.0_f64);
        for i in -49..=50 {
            let x = i as f64 / 10.0;
            let cur = norm_cdf(x);
            assert!(cur >= prev, "CDF must be non-decreasing at x = {}", x);
            prev = cur;
        }
    }

    #[test]
    fn test_norm_cdf_with_f32() {
        let cdf = norm_cdf(0.0_f32);
        assert!((cdf - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_kernel_weight_peak_and_decay() {
        let h = 1.5_f64;
        let peak = kernel_weight(0.0, h);
        assert!(peak > kernel_weight(0.5, h));
        assert!(kernel_weight(0.5, h) > kernel_weight(2.0, h));
        assert!(kernel_weight(10.0, h) < 1e-9);
    }

    #[test]
    fn test_kernel_weight_bandwidth_scaling() {
        // Wider bandwidth keeps distant quotes relevant
        assert!(kernel_weight(3.0_f64, 3.0) > kernel_weight(3.0_f64, 1.0));
    }
}
