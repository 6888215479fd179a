//! # Error Types
//!
//! All fallible library operations return [`AnalysisError`]. None of these
//! errors are transient: local file reads either succeed or they don't, so the
//! CLI reports them and exits with a non-zero status.

use chrono::NaiveDateTime;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading, averaging or rendering grids
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Missing cycle {cycle}: {} does not exist", .path.display())]
    MissingCycle { cycle: NaiveDateTime, path: PathBuf },

    #[error("Field '{field}' at level '{level}' not found in {}", .path.display())]
    FieldNotFound {
        field: String,
        level: String,
        path: PathBuf,
    },

    #[error("Shape mismatch for field '{field}': expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        field: String,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("No cycles were accumulated; cannot compute a mean over an empty series")]
    EmptySeries,

    #[error("Every sample in the grid is missing (NaN); cannot derive a color scale")]
    AllMissingData,

    #[error("Unknown field '{0}' passed to accumulate")]
    UnknownField(String),

    #[error("Field '{0}' has no values for this cycle")]
    MissingFieldValues(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("GRIB2 decoding error: {0}")]
    Grib(String),

    #[error("NetCDF error: {0}")]
    Netcdf(#[from] netcdf::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read NPY artifact: {0}")]
    NpyRead(#[from] ndarray_npy::ReadNpyError),

    #[error("Failed to write NPY artifact: {0}")]
    NpyWrite(#[from] ndarray_npy::WriteNpyError),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl From<grib::GribError> for AnalysisError {
    fn from(error: grib::GribError) -> Self {
        AnalysisError::Grib(error.to_string())
    }
}

/// Result type for library operations
pub type Result<T> = std::result::Result<T, AnalysisError>;
