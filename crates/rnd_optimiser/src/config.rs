//! Bandwidth search configuration.
//!
//! Every tunable bound of the search lives here: the (hc, hp) ranges, the
//! grid resolution, the QP iteration budget, and the kernel window width.
//! Nothing in the algorithm path reads a hard-coded constant.

use rnd_core::types::InputError;

/// Configuration for the bandwidth grid search.
///
/// # Examples
///
/// ```
/// use rnd_optimiser::config::BandwidthSearchConfig;
///
/// // Use default configuration
/// let config = BandwidthSearchConfig::default();
/// assert_eq!(config.grid_size, 32);
/// assert!(config.validate().is_ok());
///
/// // Custom configuration via the builder
/// let config = BandwidthSearchConfig::builder()
///     .hc_range(0.75, 2.0)
///     .hp_range(0.75, 2.0)
///     .grid_size(8)
///     .build();
/// assert_eq!(config.grid_size, 8);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BandwidthSearchConfig {
    /// Lower bound of the call-side bandwidth range.
    pub hc_min: f64,
    /// Upper bound of the call-side bandwidth range.
    pub hc_max: f64,
    /// Lower bound of the put-side bandwidth range.
    pub hp_min: f64,
    /// Upper bound of the put-side bandwidth range.
    pub hp_max: f64,

    /// Points per axis in each grid stage (coarse and fine).
    ///
    /// Default: 32
    pub grid_size: usize,

    /// Iteration budget for each active-set QP solve.
    ///
    /// One iteration is one normal-equation solve. Exhausting the budget
    /// degrades the fit rather than failing the cell.
    /// Default: 8
    pub qp_max_iterations: usize,

    /// Kernel window half-width in bandwidth units.
    ///
    /// Penalty terms are computed on underlying-grid points within
    /// `window_multiplier * h` of the held-out strike. Default: 3.0
    /// (the effective support of the Gaussian kernel).
    pub window_multiplier: f64,

    /// Smallest bandwidth the fine stage may step down to.
    ///
    /// The fine grid is centred on the coarse optimum and may extend one
    /// coarse step below `hc_min`/`hp_min`; this floor keeps it strictly
    /// positive. Default: 1e-8
    pub bandwidth_floor: f64,
}

impl Default for BandwidthSearchConfig {
    fn default() -> Self {
        Self {
            hc_min: 0.25,
            hc_max: 5.0,
            hp_min: 0.25,
            hp_max: 5.0,
            grid_size: 32,
            qp_max_iterations: 8,
            window_multiplier: 3.0,
            bandwidth_floor: 1e-8,
        }
    }
}

impl BandwidthSearchConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration builder for fluent construction.
    pub fn builder() -> BandwidthSearchConfigBuilder {
        BandwidthSearchConfigBuilder::new()
    }

    /// Create a fast configuration for interactive use.
    ///
    /// Uses a coarse 8x8 grid per stage.
    pub fn fast() -> Self {
        Self {
            grid_size: 8,
            ..Self::default()
        }
    }

    /// Create a high-resolution configuration.
    ///
    /// Uses a 64x64 grid per stage.
    pub fn high_resolution() -> Self {
        Self {
            grid_size: 64,
            ..Self::default()
        }
    }

    /// Set the call-side bandwidth range.
    pub fn with_hc_range(mut self, min: f64, max: f64) -> Self {
        self.hc_min = min;
        self.hc_max = max;
        self
    }

    /// Set the put-side bandwidth range.
    pub fn with_hp_range(mut self, min: f64, max: f64) -> Self {
        self.hp_min = min;
        self.hp_max = max;
        self
    }

    /// Set the per-stage grid resolution.
    pub fn with_grid_size(mut self, grid_size: usize) -> Self {
        self.grid_size = grid_size;
        self
    }

    /// Validate the configuration at the core boundary.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - All bounds are usable
    /// * `Err(InputError)` - Inverted or non-positive ranges, degenerate
    ///   grid, or an exhausted budget
    pub fn validate(&self) -> Result<(), InputError> {
        for (axis, min, max) in [
            ("hc", self.hc_min, self.hc_max),
            ("hp", self.hp_min, self.hp_max),
        ] {
            let usable = min.is_finite()
                && max.is_finite()
                && min > self.bandwidth_floor
                && min < max;
            if !usable {
                return Err(InputError::InvalidBandwidthRange { axis, min, max });
            }
        }
        if self.grid_size < 2 {
            return Err(InputError::InsufficientPoints {
                got: self.grid_size,
                need: 2,
            });
        }
        if self.qp_max_iterations == 0 {
            return Err(InputError::InsufficientPoints { got: 0, need: 1 });
        }
        if !(self.window_multiplier.is_finite() && self.window_multiplier > 0.0) {
            return Err(InputError::NonFinite {
                field: "window_multiplier",
                index: 0,
            });
        }
        if !(self.bandwidth_floor.is_finite() && self.bandwidth_floor > 0.0) {
            return Err(InputError::NonPositiveBandwidth {
                value: self.bandwidth_floor,
            });
        }
        Ok(())
    }
}

/// Builder for [`BandwidthSearchConfig`].
#[derive(Debug, Clone, Default)]
pub struct BandwidthSearchConfigBuilder {
    config: BandwidthSearchConfig,
}

impl BandwidthSearchConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self {
            config: BandwidthSearchConfig::default(),
        }
    }

    /// Set the call-side bandwidth range.
    pub fn hc_range(mut self, min: f64, max: f64) -> Self {
        self.config.hc_min = min;
        self.config.hc_max = max;
        self
    }

    /// Set the put-side bandwidth range.
    pub fn hp_range(mut self, min: f64, max: f64) -> Self {
        self.config.hp_min = min;
        self.config.hp_max = max;
        self
    }

    /// Set the per-stage grid resolution.
    pub fn grid_size(mut self, grid_size: usize) -> Self {
        self.config.grid_size = grid_size;
        self
    }

    /// Set the QP iteration budget.
    pub fn qp_max_iterations(mut self, budget: usize) -> Self {
        self.config.qp_max_iterations = budget;
        self
    }

    /// Set the kernel window half-width multiplier.
    pub fn window_multiplier(mut self, multiplier: f64) -> Self {
        self.config.window_multiplier = multiplier;
        self
    }

    /// Set the fine-stage bandwidth floor.
    pub fn bandwidth_floor(mut self, floor: f64) -> Self {
        self.config.bandwidth_floor = floor;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> BandwidthSearchConfig {
        self.config
    }
}
