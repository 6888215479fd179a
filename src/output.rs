//! # Artifact Cache Module
//!
//! Persists the products of a mean-difference run so figures can be
//! regenerated without repeating the cycle loop.
//!
//! ## Layout
//!
//! ```text
//! <cache_dir>/
//!   lats.npy
//!   lons.npy
//!   <field>_mean.npy     one per field
//!   manifest.json
//! ```
//!
//! The `.npy` files load directly with `numpy.load`. Nothing is ever evicted;
//! delete the directory to invalidate it.

use log::{debug, info};
use ndarray_npy::{read_npy, write_npy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AnalysisError, Result};
use crate::grid::{Coordinates, Grid};

pub const MANIFEST_FILE: &str = "manifest.json";
pub const LATS_FILE: &str = "lats.npy";
pub const LONS_FILE: &str = "lons.npy";

/// Run summary written next to the arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheManifest {
    pub fields: Vec<String>,
    pub start: String,
    pub end: String,
    pub cycles_accumulated: usize,
    #[serde(default)]
    pub skipped_cycles: Vec<String>,
    pub shape: (usize, usize),
    pub exp_label: String,
    pub ctl_label: String,
}

/// Everything needed to redraw the mean-difference figures.
#[derive(Debug, Clone)]
pub struct MeanDiffArtifacts {
    pub coordinates: Coordinates,
    pub means: BTreeMap<String, Grid>,
    pub manifest: CacheManifest,
}

#[derive(Debug, Clone)]
pub struct ArtifactCache {
    dir: PathBuf,
}

impl ArtifactCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ArtifactCache { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn mean_path(&self, field: &str) -> PathBuf {
        self.dir.join(format!("{}_mean.npy", field))
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.dir.join(MANIFEST_FILE)
    }

    pub fn exists(&self) -> bool {
        self.manifest_path().is_file()
    }

    /// Writes coordinates, every mean grid and the manifest.
    ///
    /// # Errors
    ///
    /// Fails when the directory cannot be created or a file cannot be written,
    /// or when a grid's shape differs from the coordinates'.
    pub fn save(&self, artifacts: &MeanDiffArtifacts) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let shape = artifacts.coordinates.shape();

        write_npy(self.dir.join(LATS_FILE), &artifacts.coordinates.lats)?;
        write_npy(self.dir.join(LONS_FILE), &artifacts.coordinates.lons)?;

        for (name, grid) in &artifacts.means {
            if grid.dim() != shape {
                return Err(AnalysisError::ShapeMismatch {
                    field: name.clone(),
                    expected: shape,
                    found: grid.dim(),
                });
            }
            let path = self.mean_path(name);
            debug!("Writing {}", path.display());
            write_npy(&path, grid)?;
        }

        let manifest = serde_json::to_string_pretty(&artifacts.manifest)?;
        fs::write(self.manifest_path(), manifest)?;
        info!(
            "Cached {} mean field(s) in {}",
            artifacts.means.len(),
            self.dir.display()
        );
        Ok(())
    }

    /// Loads a cache written by [`ArtifactCache::save`].
    pub fn load(&self) -> Result<MeanDiffArtifacts> {
        let manifest_path = self.manifest_path();
        if !manifest_path.is_file() {
            return Err(AnalysisError::SourceNotFound(manifest_path));
        }
        let manifest: CacheManifest = serde_json::from_str(&fs::read_to_string(&manifest_path)?)?;

        let lats: Grid = self.read_array(&self.dir.join(LATS_FILE))?;
        let lons: Grid = self.read_array(&self.dir.join(LONS_FILE))?;
        let coordinates = Coordinates::new(lats, lons)?;

        let mut means = BTreeMap::new();
        for name in &manifest.fields {
            let grid = self.read_array(&self.mean_path(name))?;
            if grid.dim() != coordinates.shape() {
                return Err(AnalysisError::ShapeMismatch {
                    field: name.clone(),
                    expected: coordinates.shape(),
                    found: grid.dim(),
                });
            }
            means.insert(name.clone(), grid);
        }

        Ok(MeanDiffArtifacts {
            coordinates,
            means,
            manifest,
        })
    }

    fn read_array(&self, path: &Path) -> Result<Grid> {
        if !path.is_file() {
            return Err(AnalysisError::SourceNotFound(path.to_path_buf()));
        }
        Ok(read_npy(path)?)
    }
}
