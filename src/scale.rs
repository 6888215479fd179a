//! # Color Scale Bounds
//!
//! Robust `(low, high)` ranges for mapping grid values onto a colormap.
//! Absolute fields use `mean ± 3·std`; signed differences use a range
//! symmetric about zero so the neutral color sits at zero.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::grid::{Grid, GridStats};

/// Smallest half-width handed to a renderer.
pub const MIN_HALF_WIDTH: f64 = 1e-10;

/// Multiplier applied to the standard deviation for absolute scales.
pub const STD_MULTIPLIER: f64 = 3.0;

/// A render-only `(low, high)` pair. Always satisfies `low < high`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleBounds {
    pub low: f64,
    pub high: f64,
}

impl ScaleBounds {
    pub fn new(low: f64, high: f64) -> Self {
        ScaleBounds { low, high }
    }

    pub fn width(&self) -> f64 {
        self.high - self.low
    }

    /// Maps `value` into `[0, 1]`, clamping values outside the bounds.
    pub fn normalize(&self, value: f64) -> f64 {
        ((value - self.low) / self.width()).clamp(0.0, 1.0)
    }

    pub fn as_tuple(&self) -> (f64, f64) {
        (self.low, self.high)
    }
}

/// Derives color scale bounds from the non-NaN samples of `grid`.
///
/// With `symmetric == false` the range is `mean ± 3·std`, or `[min, max]`
/// when the standard deviation is zero. With `symmetric == true` the range is
/// `±max(|min|, |max|)`, falling back to `std` and then to
/// [`MIN_HALF_WIDTH`] when that bound is zero.
///
/// Fails with [`AnalysisError::AllMissingData`](crate::error::AnalysisError::AllMissingData)
/// when every sample is NaN.
pub fn compute_scale_bounds(grid: &Grid, symmetric: bool) -> Result<ScaleBounds> {
    let stats = GridStats::compute(grid)?;
    Ok(bounds_from_stats(&stats, symmetric))
}

pub fn bounds_from_stats(stats: &GridStats, symmetric: bool) -> ScaleBounds {
    if symmetric {
        let mut bound = stats.min.abs().max(stats.max.abs());
        if bound == 0.0 {
            bound = if stats.std > 0.0 { stats.std } else { MIN_HALF_WIDTH };
        }
        return ScaleBounds::new(-bound, bound);
    }

    let (low, high) = if stats.std > 0.0 {
        (
            stats.mean - STD_MULTIPLIER * stats.std,
            stats.mean + STD_MULTIPLIER * stats.std,
        )
    } else {
        (stats.min, stats.max)
    };

    if low < high {
        ScaleBounds::new(low, high)
    } else {
        // constant field: widen around the value so the scale is never zero width
        let center = (low + high) / 2.0;
        let half = (center.abs() * 1e-6).max(MIN_HALF_WIDTH);
        ScaleBounds::new(center - half, center + half)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use ndarray::{Array2, array};

    #[test]
    fn test_absolute_bounds_mean_three_std() {
        let grid = array![[-5.0, 5.0], [0.0, 10.0]];
        let bounds = compute_scale_bounds(&grid, false).unwrap();

        let mean = 2.5;
        let std = (((-7.5f64).powi(2) + 2.5f64.powi(2) + (-2.5f64).powi(2) + 7.5f64.powi(2))
            / 4.0)
            .sqrt();
        assert!((bounds.low - (mean - 3.0 * std)).abs() < 1e-12);
        assert!((bounds.high - (mean + 3.0 * std)).abs() < 1e-12);
    }

    #[test]
    fn test_symmetric_all_zero_falls_back_to_epsilon() {
        let grid = Array2::zeros((4, 4));
        let bounds = compute_scale_bounds(&grid, true).unwrap();
        assert_eq!(bounds.as_tuple(), (-1e-10, 1e-10));
    }

    #[test]
    fn test_symmetric_uses_largest_magnitude() {
        let grid = array![[-3.0, 1.0], [0.5, 2.0]];
        let bounds = compute_scale_bounds(&grid, true).unwrap();
        assert_eq!(bounds.as_tuple(), (-3.0, 3.0));
        assert_eq!(bounds.low, -bounds.high);
    }

    #[test]
    fn test_symmetric_ignores_nan() {
        let grid = array![[f64::NAN, -0.25], [0.5, f64::NAN]];
        let bounds = compute_scale_bounds(&grid, true).unwrap();
        assert_eq!(bounds.as_tuple(), (-0.5, 0.5));
    }

    #[test]
    fn test_all_nan_is_an_error() {
        let grid = Array2::from_elem((2, 2), f64::NAN);
        assert!(matches!(
            compute_scale_bounds(&grid, false),
            Err(AnalysisError::AllMissingData)
        ));
        assert!(matches!(
            compute_scale_bounds(&grid, true),
            Err(AnalysisError::AllMissingData)
        ));
    }

    #[test]
    fn test_constant_grid_is_never_zero_width() {
        let grid = Array2::from_elem((3, 3), 273.15);
        let bounds = compute_scale_bounds(&grid, false).unwrap();
        assert!(bounds.low < bounds.high);
        assert!(bounds.low < 273.15 && bounds.high > 273.15);

        let zeros = Array2::zeros((3, 3));
        let bounds = compute_scale_bounds(&zeros, false).unwrap();
        assert_eq!(bounds.as_tuple(), (-1e-10, 1e-10));
    }

    #[test]
    fn test_low_below_high_for_varied_inputs() {
        let grids = [
            array![[1.0, 2.0], [3.0, 4.0]],
            array![[-100.0, 0.0], [0.0, 0.001]],
            array![[1e6, 1e6 + 1.0], [f64::NAN, 1e6]],
            array![[-1e-8, 1e-8], [0.0, 0.0]],
        ];
        for grid in &grids {
            for symmetric in [false, true] {
                let bounds = compute_scale_bounds(grid, symmetric).unwrap();
                assert!(bounds.low < bounds.high, "{:?} symmetric={}", grid, symmetric);
            }
        }
    }

    #[test]
    fn test_normalize_clamps() {
        let bounds = ScaleBounds::new(-2.0, 2.0);
        assert_eq!(bounds.normalize(0.0), 0.5);
        assert_eq!(bounds.normalize(10.0), 1.0);
        assert_eq!(bounds.normalize(-10.0), 0.0);
    }
}
