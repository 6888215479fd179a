//! # Grid Series Averager
//!
//! Accumulates `experiment − control` for several fields over a series of
//! forecast cycles and produces the time-mean difference of each field.
//!
//! All fields are accumulated in lockstep: one [`GridSeriesAverager::accumulate`]
//! call per cycle supplies every tracked field, and a single shared count is
//! used as the denominator for all of them.
//!
//! ```rust
//! use std::collections::HashMap;
//! use chrono::NaiveDate;
//! use ndarray::Array2;
//! use nwpdiff::averager::{FieldPair, GridSeriesAverager};
//!
//! let mut averager = GridSeriesAverager::new(["T"]);
//! let cycle = NaiveDate::from_ymd_opt(2024, 10, 25).unwrap().and_hms_opt(0, 0, 0).unwrap();
//!
//! let mut values = HashMap::new();
//! values.insert(
//!     "T".to_string(),
//!     FieldPair::new(Array2::from_elem((2, 2), 10.0), Array2::from_elem((2, 2), 8.0)),
//! );
//! averager.accumulate(cycle, &values)?;
//!
//! let means = averager.finalize()?;
//! assert_eq!(means["T"][[0, 0]], 2.0);
//! # Ok::<(), nwpdiff::error::AnalysisError>(())
//! ```

use chrono::NaiveDateTime;
use log::debug;
use ndarray::{Array2, Zip};
use std::collections::{BTreeMap, HashMap};

use crate::error::{AnalysisError, Result};
use crate::grid::Grid;
use crate::scale::{ScaleBounds, compute_scale_bounds};

/// The experiment and control grids of one field for one cycle.
#[derive(Debug, Clone)]
pub struct FieldPair {
    pub experiment: Grid,
    pub control: Grid,
}

impl FieldPair {
    pub fn new(experiment: Grid, control: Grid) -> Self {
        FieldPair {
            experiment,
            control,
        }
    }
}

/// Running sums of per-cycle differences, one per tracked field.
#[derive(Debug, Clone)]
pub struct GridSeriesAverager {
    field_names: Vec<String>,
    sums: HashMap<String, Grid>,
    shape: Option<(usize, usize)>,
    count: usize,
}

impl GridSeriesAverager {
    /// Creates an averager whose grid shape is taken from the first accumulated cycle.
    pub fn new<I, S>(field_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        GridSeriesAverager {
            field_names: field_names.into_iter().map(Into::into).collect(),
            sums: HashMap::new(),
            shape: None,
            count: 0,
        }
    }

    /// Creates an averager with zero-filled sums of a known shape.
    pub fn with_shape<I, S>(field_names: I, shape: (usize, usize)) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut averager = Self::new(field_names);
        averager.allocate(shape);
        averager
    }

    fn allocate(&mut self, shape: (usize, usize)) {
        self.shape = Some(shape);
        self.sums = self
            .field_names
            .iter()
            .map(|name| (name.clone(), Array2::zeros(shape)))
            .collect();
    }

    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    /// Number of cycles accumulated so far.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn shape(&self) -> Option<(usize, usize)> {
        self.shape
    }

    /// Adds `experiment − control` of every tracked field into its running sum
    /// and increments the shared cycle count.
    ///
    /// `values` must hold a pair for every tracked field, with matching
    /// shapes. Everything is validated before any sum is touched, so a failed
    /// call leaves the averager as it was.
    pub fn accumulate(
        &mut self,
        cycle: NaiveDateTime,
        values: &HashMap<String, FieldPair>,
    ) -> Result<()> {
        if let Some(name) = values
            .keys()
            .find(|k| !self.field_names.iter().any(|n| n == *k))
        {
            return Err(AnalysisError::UnknownField(name.clone()));
        }

        let shape = match self.shape {
            Some(shape) => shape,
            None => {
                let first = self
                    .field_names
                    .first()
                    .and_then(|name| values.get(name))
                    .ok_or_else(|| {
                        AnalysisError::MissingFieldValues(
                            self.field_names.first().cloned().unwrap_or_default(),
                        )
                    })?;
                first.experiment.dim()
            }
        };

        for name in &self.field_names {
            let pair = values
                .get(name)
                .ok_or_else(|| AnalysisError::MissingFieldValues(name.clone()))?;
            for grid in [&pair.experiment, &pair.control] {
                if grid.dim() != shape {
                    return Err(AnalysisError::ShapeMismatch {
                        field: name.clone(),
                        expected: shape,
                        found: grid.dim(),
                    });
                }
            }
        }

        if self.shape.is_none() {
            self.allocate(shape);
        }

        for name in &self.field_names {
            let pair = &values[name];
            if let Some(sum) = self.sums.get_mut(name) {
                Zip::from(sum)
                    .and(&pair.experiment)
                    .and(&pair.control)
                    .for_each(|s, &e, &c| *s += e - c);
            }
        }
        self.count += 1;

        debug!(
            "Accumulated cycle {} ({} field(s), {} cycle(s) total)",
            cycle,
            self.field_names.len(),
            self.count
        );
        Ok(())
    }

    /// Returns the time-mean difference of every field.
    ///
    /// Does not modify the running sums, so calling it again without further
    /// accumulation returns the same grids.
    pub fn finalize(&self) -> Result<BTreeMap<String, Grid>> {
        if self.count == 0 {
            return Err(AnalysisError::EmptySeries);
        }
        let n = self.count as f64;
        Ok(self
            .field_names
            .iter()
            .filter_map(|name| self.sums.get(name).map(|sum| (name.clone(), sum / n)))
            .collect())
    }

    /// Scale bounds for rendering any grid, see [`compute_scale_bounds`].
    pub fn compute_scale_bounds(grid: &Grid, symmetric: bool) -> Result<ScaleBounds> {
        compute_scale_bounds(grid, symmetric)
    }
}
