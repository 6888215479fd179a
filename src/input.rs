//! # Input Configuration Module
//!
//! Configuration for mean-difference jobs: where the control and experiment
//! archives live, which cycles to visit, which fields to compare and where to
//! write results.
//!
//! ## Configuration Structure
//!
//! - **ctrl_root** / **exp_root**: archive roots substituted for `{root}`
//! - **start** / **end**: first and last cycle, both inclusive
//! - **step_hours**: cycle spacing (default 6)
//! - **fields**: named short-name/level pairs (default: the snow-DA set)
//! - **output_dir** / **cache_dir**: figure and `.npy` destinations
//! - **on_missing**: `abort` (default) or `skip`
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use nwpdiff::input::JobConfig;
//!
//! let config = JobConfig::from_file("snow_da.yaml")?;
//!
//! let json = r#"
//! {
//!   "ctrl_root": "/data/ctrl_grib2",
//!   "exp_root": "/data/snowda_grib2",
//!   "start": "2024-10-25T00",
//!   "end": "2025-03-24T00"
//! }"#;
//! let config = JobConfig::from_json(json)?;
//! assert_eq!(config.fields.len(), 4);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cycles::{
    CyclePathLayout, CycleRange, DEFAULT_STEP_HOURS, GDAS_PGRB2_TEMPLATE, parse_cycle_time,
};
use crate::error::{AnalysisError, Result};
use crate::fields::{FieldSpec, snow_da_fields};
use crate::render::Region;

/// What to do when a cycle's control or experiment file does not exist.
#[derive(ValueEnum, Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MissingCyclePolicy {
    /// Fail the run on the first missing cycle
    #[default]
    Abort,
    /// Log the cycle, leave it out of the mean and continue
    Skip,
}

/// A mean-difference job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    /// Root of the control archive
    pub ctrl_root: String,
    /// Root of the experiment archive
    pub exp_root: String,
    /// First cycle (`YYYY-MM-DDTHH`, `YYYYMMDDHH` or RFC 3339)
    pub start: String,
    /// Last cycle, inclusive
    pub end: String,
    #[serde(default = "default_step_hours")]
    pub step_hours: i64,
    #[serde(default = "default_forecast_hour")]
    pub forecast_hour: String,
    #[serde(default = "default_path_template")]
    pub path_template: String,
    #[serde(default = "snow_da_fields")]
    pub fields: Vec<FieldSpec>,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// Where `.npy` artifacts go; defaults to `output_dir`
    #[serde(default)]
    pub cache_dir: Option<String>,
    #[serde(default)]
    pub on_missing: MissingCyclePolicy,
    #[serde(default)]
    pub region: Region,
    #[serde(default = "default_exp_label")]
    pub exp_label: String,
    #[serde(default = "default_ctl_label")]
    pub ctl_label: String,
}

fn default_step_hours() -> i64 {
    DEFAULT_STEP_HOURS
}

fn default_forecast_hour() -> String {
    "f000".to_string()
}

fn default_path_template() -> String {
    GDAS_PGRB2_TEMPLATE.to_string()
}

fn default_output_dir() -> String {
    ".".to_string()
}

fn default_exp_label() -> String {
    "snowda".to_string()
}

fn default_ctl_label() -> String {
    "ctl".to_string()
}

impl JobConfig {
    /// A job over the default fields, layout and labels.
    pub fn new(ctrl_root: &str, exp_root: &str, start: &str, end: &str) -> Self {
        JobConfig {
            ctrl_root: ctrl_root.to_string(),
            exp_root: exp_root.to_string(),
            start: start.to_string(),
            end: end.to_string(),
            step_hours: default_step_hours(),
            forecast_hour: default_forecast_hour(),
            path_template: default_path_template(),
            fields: snow_da_fields(),
            output_dir: default_output_dir(),
            cache_dir: None,
            on_missing: MissingCyclePolicy::default(),
            region: Region::default(),
            exp_label: default_exp_label(),
            ctl_label: default_ctl_label(),
        }
    }

    /// Loads a configuration file, choosing YAML for `.yaml`/`.yml` and JSON otherwise.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AnalysisError::SourceNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            _ => Self::from_json(&content),
        }
    }

    pub fn from_json(json_str: &str) -> Result<Self> {
        Ok(serde_json::from_str(json_str)?)
    }

    pub fn from_yaml(yaml_str: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml_str)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn cycle_range(&self) -> Result<CycleRange> {
        CycleRange::every_hours(
            parse_cycle_time(&self.start)?,
            parse_cycle_time(&self.end)?,
            self.step_hours,
        )
    }

    pub fn layout(&self) -> CyclePathLayout {
        CyclePathLayout::new(&self.path_template, &self.forecast_hour)
    }

    pub fn cache_path(&self) -> PathBuf {
        PathBuf::from(self.cache_dir.as_deref().unwrap_or(&self.output_dir))
    }

    pub fn figure_path(&self, field: &str) -> PathBuf {
        Path::new(&self.output_dir).join(format!("{}_diff.png", field))
    }

    /// Checks everything that can be checked without touching the archives.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Config`] for empty roots, an empty or
    /// duplicated field list, unknown short names or levels, unparseable cycle
    /// times, a non-positive step or a template without `{root}`.
    pub fn validate(&self) -> Result<()> {
        if self.ctrl_root.trim().is_empty() || self.exp_root.trim().is_empty() {
            return Err(AnalysisError::Config(
                "ctrl_root and exp_root must not be empty".to_string(),
            ));
        }
        if !self.path_template.contains("{root}") {
            return Err(AnalysisError::Config(format!(
                "path_template '{}' has no {{root}} placeholder",
                self.path_template
            )));
        }
        if self.fields.is_empty() {
            return Err(AnalysisError::Config("at least one field is required".to_string()));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(AnalysisError::Config(format!(
                    "field name '{}' appears more than once",
                    field.name
                )));
            }
            field.selector()?;
        }

        self.cycle_range()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::LevelSpec;
    use tempfile::tempdir;

    #[test]
    fn test_from_json_applies_defaults() {
        let json = r#"
        {
            "ctrl_root": "/data/ctrl",
            "exp_root": "/data/exp",
            "start": "2024-10-25T00",
            "end": "2024-10-26T00"
        }"#;
        let config = JobConfig::from_json(json).unwrap();
        assert_eq!(config.step_hours, 6);
        assert_eq!(config.forecast_hour, "f000");
        assert_eq!(config.path_template, GDAS_PGRB2_TEMPLATE);
        assert_eq!(config.on_missing, MissingCyclePolicy::Abort);
        assert_eq!(config.region, Region::Global);
        assert_eq!(config.fields, snow_da_fields());
        assert_eq!(config.cache_path(), PathBuf::from("."));
        assert_eq!(config.cycle_range().unwrap().len(), 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_yaml_with_fields() {
        let yaml = r#"
ctrl_root: /data/ctrl
exp_root: /data/exp
start: "2025010100"
end: "2025010112"
step_hours: 12
on_missing: skip
region: conus
cache_dir: /tmp/cache
fields:
  - name: T_500
    short_name: TMP
    level: 500 mb
    units: K
"#;
        let config = JobConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.on_missing, MissingCyclePolicy::Skip);
        assert_eq!(config.region, Region::Conus);
        assert_eq!(config.fields.len(), 1);
        assert_eq!(config.fields[0].units.as_deref(), Some("K"));
        let selector = config.fields[0].selector().unwrap();
        assert_eq!(selector.level, LevelSpec::Isobaric(500.0));
        assert_eq!(config.cache_path(), PathBuf::from("/tmp/cache"));
        assert_eq!(config.cycle_range().unwrap().len(), 2);
    }

    #[test]
    fn test_from_file_detects_format() {
        let dir = tempdir().unwrap();
        let config = JobConfig::new("/c", "/e", "2024-10-25T00", "2024-10-25T18");

        let json_path = dir.path().join("job.json");
        fs::write(&json_path, config.to_json().unwrap()).unwrap();
        assert_eq!(JobConfig::from_file(&json_path).unwrap(), config);

        let yaml_path = dir.path().join("job.yml");
        fs::write(&yaml_path, config.to_yaml().unwrap()).unwrap();
        assert_eq!(JobConfig::from_file(&yaml_path).unwrap(), config);

        assert!(matches!(
            JobConfig::from_file(dir.path().join("absent.json")),
            Err(AnalysisError::SourceNotFound(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_configs() {
        let base = JobConfig::new("/c", "/e", "2024-10-25T00", "2024-10-26T00");

        let mut config = base.clone();
        config.fields.clear();
        assert!(config.validate().is_err());

        let mut config = base.clone();
        config.fields.push(FieldSpec::new("T_850", "TMP", "500 mb"));
        assert!(config.validate().is_err());

        let mut config = base.clone();
        config.fields = vec![FieldSpec::new("dust", "DUST", "surface")];
        assert!(config.validate().is_err());

        let mut config = base.clone();
        config.step_hours = 0;
        assert!(config.validate().is_err());

        let mut config = base.clone();
        config.step_hours = i64::MAX;
        assert!(matches!(config.validate(), Err(AnalysisError::Config(_))));

        let mut config = base.clone();
        config.start = "yesterday".to_string();
        assert!(config.validate().is_err());

        let mut config = base;
        config.path_template = "/fixed/file.grib2".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_paths() {
        let mut config = JobConfig::new("/c", "/e", "2024-10-25T00", "2024-10-26T00");
        config.output_dir = "figs".to_string();
        assert_eq!(config.figure_path("T_850"), PathBuf::from("figs/T_850_diff.png"));
        assert_eq!(config.cache_path(), PathBuf::from("figs"));
    }
}
