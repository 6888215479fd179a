//! # Grid Types
//!
//! Dense 2-D grids over a latitude/longitude mesh, plus the NaN-aware summary
//! statistics used for color scaling.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// A dense 2-D array of samples, row-major (latitude rows, longitude columns).
pub type Grid = Array2<f64>;

/// Parallel latitude/longitude arrays with the same shape as the grids they describe.
#[derive(Debug, Clone, PartialEq)]
pub struct Coordinates {
    pub lats: Grid,
    pub lons: Grid,
}

impl Coordinates {
    pub fn new(lats: Grid, lons: Grid) -> Result<Self> {
        if lats.dim() != lons.dim() {
            return Err(AnalysisError::ShapeMismatch {
                field: "longitude".to_string(),
                expected: lats.dim(),
                found: lons.dim(),
            });
        }
        Ok(Coordinates { lats, lons })
    }

    /// Builds a regular mesh from 1-D latitude and longitude axes.
    pub fn from_axes(lat_axis: &[f64], lon_axis: &[f64]) -> Self {
        let shape = (lat_axis.len(), lon_axis.len());
        let lats = Array2::from_shape_fn(shape, |(i, _)| lat_axis[i]);
        let lons = Array2::from_shape_fn(shape, |(_, j)| lon_axis[j]);
        Coordinates { lats, lons }
    }

    pub fn shape(&self) -> (usize, usize) {
        self.lats.dim()
    }
}

/// Summary statistics over the finite samples of a grid.
///
/// Mirrors numpy's `nanmean`, `nanstd` (population, ddof = 0), `nanmin` and
/// `nanmax`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridStats {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub valid_count: usize,
}

impl GridStats {
    /// Computes statistics over the finite samples; NaN and ±inf are skipped.
    ///
    /// Fails with [`AnalysisError::AllMissingData`] when the grid holds no
    /// finite sample at all.
    pub fn compute(grid: &Grid) -> Result<Self> {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for &v in grid.iter().filter(|v| v.is_finite()) {
            count += 1;
            sum += v;
            min = min.min(v);
            max = max.max(v);
        }

        if count == 0 {
            return Err(AnalysisError::AllMissingData);
        }

        let mean = sum / count as f64;
        let variance = grid
            .iter()
            .filter(|v| v.is_finite())
            .map(|v| (v - mean).powi(2))
            .sum::<f64>()
            / count as f64;

        Ok(GridStats {
            mean,
            std: variance.sqrt(),
            min,
            max,
            valid_count: count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_stats_ignore_nan() {
        let grid = array![[1.0, f64::NAN], [3.0, 5.0]];
        let stats = GridStats::compute(&grid).unwrap();
        assert_eq!(stats.valid_count, 3);
        assert!((stats.mean - 3.0).abs() < 1e-12);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 5.0);
        // population std of [1, 3, 5]
        assert!((stats.std - (8.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_stats_ignore_infinities() {
        let grid = array![[2.0, f64::INFINITY], [f64::NEG_INFINITY, 4.0]];
        let stats = GridStats::compute(&grid).unwrap();
        assert_eq!(stats.valid_count, 2);
        assert_eq!(stats.mean, 3.0);
        assert_eq!(stats.std, 1.0);
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 4.0);

        let only_inf = array![[f64::INFINITY, f64::NEG_INFINITY]];
        assert!(matches!(
            GridStats::compute(&only_inf),
            Err(AnalysisError::AllMissingData)
        ));
    }

    #[test]
    fn test_stats_all_nan() {
        let grid = Array2::from_elem((3, 4), f64::NAN);
        assert!(matches!(
            GridStats::compute(&grid),
            Err(AnalysisError::AllMissingData)
        ));
    }

    #[test]
    fn test_coordinates_from_axes() {
        let coords = Coordinates::from_axes(&[10.0, 0.0, -10.0], &[0.0, 90.0]);
        assert_eq!(coords.shape(), (3, 2));
        assert_eq!(coords.lats[[2, 1]], -10.0);
        assert_eq!(coords.lons[[2, 1]], 90.0);
    }

    #[test]
    fn test_coordinates_shape_mismatch() {
        let lats = Array2::zeros((2, 3));
        let lons = Array2::zeros((3, 2));
        assert!(Coordinates::new(lats, lons).is_err());
    }
}
