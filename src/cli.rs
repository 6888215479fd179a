//! # CLI Module
//!
//! This module provides the command-line interface for nwpdiff, including:
//! - Argument parsing with clap
//! - Job configuration loading (JSON/YAML) with command-line overrides
//! - Environment variable support with the NWPDIFF_ prefix
//! - Subcommands for every workflow
//! - Field DSL parsing for command line and environment variables
//!
//! Priority for mean-diff settings: CLI arguments > environment variables >
//! configuration file > defaults.

use crate::error::{AnalysisError, Result};
use crate::fields::FieldSpec;
use crate::input::{JobConfig, MissingCyclePolicy};
use crate::render::{Colormap, Region};
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Compare NWP experiment outputs and render difference maps
#[derive(Parser, Debug)]
#[command(name = "nwpdiff")]
#[command(about = "Compare control and experiment NWP output stored as GRIB2/NetCDF grids")]
#[command(version)]
#[command(long_about = "
nwpdiff compares two numerical-weather-prediction experiments (control vs
experiment) stored as GRIB2 and NetCDF grids and renders georeferenced PNG maps.

FEATURES:
  • Time-mean differences over a cycle series, with skip/abort missing-cycle policy
  • Robust color scales (mean ± 3 std, or symmetric about zero for differences)
  • .npy artifact cache so figures can be redrawn without re-reading archives
  • Single-file plots, two-file differences and FV3 cubed-sphere tile maps
  • Shell completions: bash, zsh, fish and PowerShell

EXAMPLES:
  # Plot one field
  nwpdiff plot gdas.t00z.pgrb2.0p25.f000 -n TMP -l '850 mb'

  # Difference of two files
  nwpdiff diff ctl.grib2 exp.grib2 -n PRMSL -l 'mean sea level' --region conus

  # Mean differences over a season
  nwpdiff mean-diff --config snow_da.yaml --on-missing skip

  # Redraw from the cache
  nwpdiff mean-diff --config snow_da.yaml --from-cache

  # Generate a job template
  nwpdiff template snow-da --format yaml > snow_da.yaml
")]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode - suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output format for structured data
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Job configuration file path (JSON or YAML)
    #[arg(short, long, global = true, env = "NWPDIFF_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Plot one field from a GRIB2 file
    #[command(long_about = "
Plot one field from a GRIB2 file with a mean ± 3 std color scale and 21
contour levels. The colorbar label is the field's units.

EXAMPLES:
  nwpdiff plot gfs.t00z.pgrb2.0p25.f006 -n TMP -l '1000 mb'
  nwpdiff plot aero.grib2 -n TMP -l '2 m above ground' --region conus -o t2m.png
")]
    Plot {
        /// GRIB2 file
        file: PathBuf,

        /// GRIB short name
        #[arg(short = 'n', long, default_value = "TMP", env = "NWPDIFF_VARIABLE")]
        variable: String,

        /// Level, e.g. '850 mb', 'surface', '2 m above ground'
        #[arg(short, long, default_value = "1000 mb", env = "NWPDIFF_LEVEL")]
        level: String,

        /// Output PNG (default: <variable>_<level>.png)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Map extent
        #[arg(long, value_enum, default_value_t = Region::Global)]
        region: Region,

        /// Prefix for the figure title
        #[arg(long, default_value = "GRIB file")]
        title_prefix: String,

        /// Colormap
        #[arg(long, value_enum, default_value_t = Colormap::Viridis)]
        colormap: Colormap,

        /// Number of contour levels (0 for a continuous mesh)
        #[arg(long, default_value_t = 21)]
        levels: usize,
    },

    /// Plot the difference FILE2 - FILE1 of one field
    #[command(long_about = "
Plot FILE2 - FILE1 for one field with a color scale symmetric about zero.
Both files must hold the field on the same grid.

EXAMPLES:
  nwpdiff diff ctl.grib2 exp.grib2 -n TMP -l '850 mb'
  nwpdiff diff a.grib2 b.grib2 -n SNOD -l surface --title-prefix 'Snow DA' -o snod.png
")]
    Diff {
        /// First (reference) GRIB2 file
        file1: PathBuf,

        /// Second GRIB2 file
        file2: PathBuf,

        /// GRIB short name
        #[arg(short = 'n', long, default_value = "TMP", env = "NWPDIFF_VARIABLE")]
        variable: String,

        /// Level, e.g. '850 mb', 'surface', '2 m above ground'
        #[arg(short, long, default_value = "1000 mb", env = "NWPDIFF_LEVEL")]
        level: String,

        /// Output PNG (default: <variable>_<level>_diff.png)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Map extent
        #[arg(long, value_enum, default_value_t = Region::Global)]
        region: Region,

        /// Prefix for the figure title
        #[arg(long, default_value = "GRIB Difference")]
        title_prefix: String,

        /// Colormap
        #[arg(long, value_enum, default_value_t = Colormap::Coolwarm)]
        colormap: Colormap,

        /// Number of contour levels (0 for a continuous mesh)
        #[arg(long, default_value_t = 21)]
        levels: usize,
    },

    /// Average experiment - control over a cycle series
    #[command(long_about = "
Walk every cycle between START and END, read each field from the control and
experiment archives, and average the differences. Writes lats.npy, lons.npy,
<field>_mean.npy and manifest.json to the cache directory, then one
<field>_diff.png per field.

Settings come from --config and can be overridden by flags or NWPDIFF_*
environment variables.

EXAMPLES:
  nwpdiff mean-diff --ctrl-root /data/ctrl --exp-root /data/snowda \\
    --start 2024-10-25T00 --end 2025-03-24T00

  nwpdiff mean-diff --config job.yaml --field 'T_500:TMP:500 mb:K' --on-missing skip

  nwpdiff mean-diff --config job.yaml --from-cache
")]
    MeanDiff(MeanDiffArgs),

    /// Plot a NetCDF variable over the six FV3 cubed-sphere tiles
    #[command(long_about = "
Plot a variable from <DATA_PREFIX>tile<N>.nc using geolat/geolon from
<ORO_PREFIX>tile<N>.nc for N = 1..6. Missing tiles are reported and skipped.

EXAMPLES:
  nwpdiff tiles 20250101.000000.sfcanl_data. C384.mx025_oro_data.
  nwpdiff tiles 20250101.000000.sfcanl_data. C384.mx025_oro_data. --region conus
")]
    Tiles {
        /// Prefix of the data tiles
        data_prefix: String,

        /// Prefix of the orography tiles
        oro_prefix: String,

        /// NetCDF variable to plot
        #[arg(short = 'n', long, default_value = "snodl")]
        variable: String,

        /// Map extent (conus switches to 0..500 on blues)
        #[arg(long, value_enum, default_value_t = Region::Global)]
        region: Region,

        /// Output PNG (default: <variable>_<region>.png)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Lower color bound
        #[arg(long, allow_hyphen_values = true)]
        vmin: Option<f64>,

        /// Upper color bound
        #[arg(long, allow_hyphen_values = true)]
        vmax: Option<f64>,

        /// Colormap
        #[arg(long, value_enum)]
        colormap: Option<Colormap>,
    },

    /// Show information about a GRIB2 or NetCDF file
    #[command(long_about = "
Inspect a GRIB2 file (submessage listing with short name, level, lead time and
grid shape) or a NetCDF file (dimensions, variables and attributes).

EXAMPLES:
  nwpdiff info gdas.t00z.pgrb2.0p25.f000
  nwpdiff info gdas.t00z.pgrb2.0p25.f000 -n TMP --format csv
  nwpdiff info sfcanl_data.tile1.nc --detailed --format json
")]
    Info {
        /// GRIB2 or NetCDF file
        file: PathBuf,

        /// Include NetCDF global attributes
        #[arg(long)]
        detailed: bool,

        /// Show only this short name (GRIB2) or variable (NetCDF)
        #[arg(short = 'n', long)]
        variable: Option<String>,

        /// Output format for file information
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Validate a job configuration file
    #[command(long_about = "
Load a job configuration and check roots, fields, levels, cycle times and the
path template without reading any data.

EXAMPLES:
  nwpdiff validate job.yaml
  nwpdiff validate job.json --detailed
")]
    Validate {
        /// Configuration file to validate
        config_file: Option<PathBuf>,

        /// Also list every cycle and its resolved paths
        #[arg(long)]
        detailed: bool,
    },

    /// Generate job configuration templates
    #[command(long_about = "
Generate a job configuration template.

Available templates:
• basic: one field over one day
• snow-da: the snow data-assimilation comparison (four fields, one season)

EXAMPLES:
  nwpdiff template basic
  nwpdiff template snow-da --format yaml -o snow_da.yaml
")]
    Template {
        /// Template type to generate
        #[arg(value_enum)]
        template_type: TemplateType,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration format
        #[arg(long, value_enum, default_value_t = ConfigFormat::Json)]
        format: ConfigFormat,
    },

    /// Generate shell completions
    #[command(long_about = "
Generate shell completion scripts for bash, zsh, fish and PowerShell.

EXAMPLES:
  nwpdiff completions bash > ~/.bash_completion.d/nwpdiff
  nwpdiff completions zsh -o _nwpdiff
")]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Mean-diff settings; every one of them overrides the configuration file.
#[derive(Args, Debug, Clone, Default)]
pub struct MeanDiffArgs {
    /// Control archive root
    #[arg(long, env = "NWPDIFF_CTRL_ROOT")]
    pub ctrl_root: Option<String>,

    /// Experiment archive root
    #[arg(long, env = "NWPDIFF_EXP_ROOT")]
    pub exp_root: Option<String>,

    /// First cycle (YYYY-MM-DDTHH, YYYYMMDDHH or RFC 3339)
    #[arg(long, env = "NWPDIFF_START")]
    pub start: Option<String>,

    /// Last cycle, inclusive
    #[arg(long, env = "NWPDIFF_END")]
    pub end: Option<String>,

    /// Hours between cycles
    #[arg(long, env = "NWPDIFF_STEP_HOURS")]
    pub step_hours: Option<i64>,

    /// Forecast hour label substituted for {fhr}
    #[arg(long, env = "NWPDIFF_FORECAST_HOUR")]
    pub forecast_hour: Option<String>,

    /// Product path template with {root}, {ymd}, {hh} and {fhr}
    #[arg(long, env = "NWPDIFF_PATH_TEMPLATE")]
    pub path_template: Option<String>,

    /// Field: name:SHORT_NAME:level[:units] (can be used multiple times)
    #[arg(long = "field", value_parser = parse_field_spec)]
    pub fields: Vec<FieldSpec>,

    /// Figure directory
    #[arg(long, env = "NWPDIFF_OUTPUT_DIR")]
    pub output_dir: Option<String>,

    /// Artifact cache directory (default: the figure directory)
    #[arg(long, env = "NWPDIFF_CACHE_DIR")]
    pub cache_dir: Option<String>,

    /// What to do when a cycle file is missing
    #[arg(long, value_enum, env = "NWPDIFF_ON_MISSING")]
    pub on_missing: Option<MissingCyclePolicy>,

    /// Map extent
    #[arg(long, value_enum, env = "NWPDIFF_REGION")]
    pub region: Option<Region>,

    /// Experiment label used in titles
    #[arg(long)]
    pub exp_label: Option<String>,

    /// Control label used in titles
    #[arg(long)]
    pub ctl_label: Option<String>,

    /// Skip accumulation and redraw the figures from the cache
    #[arg(long)]
    pub from_cache: bool,

    /// Validate and print the resolved job without reading data
    #[arg(long, env = "NWPDIFF_DRY_RUN")]
    pub dry_run: bool,
}

#[derive(ValueEnum, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON structured output
    Json,
    /// YAML structured output
    Yaml,
    /// CSV output (where applicable)
    Csv,
}

#[derive(ValueEnum, Clone, Debug, PartialEq, Eq)]
pub enum TemplateType {
    /// One field over one day
    Basic,
    /// Snow data-assimilation comparison
    SnowDa,
}

#[derive(ValueEnum, Clone, Debug, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON configuration format
    Json,
    /// YAML configuration format
    Yaml,
}

/// Parse field argument from command line
/// Format: name:SHORT_NAME:level[:units]
pub fn parse_field_spec(s: &str) -> std::result::Result<FieldSpec, String> {
    let parts: Vec<&str> = s.split(':').map(str::trim).collect();
    if !(3..=4).contains(&parts.len()) {
        return Err("Field must be in format 'name:SHORT_NAME:level[:units]'".to_string());
    }
    if parts[..3].iter().any(|p| p.is_empty()) {
        return Err("Field name, short name and level cannot be empty".to_string());
    }

    let mut field = FieldSpec::new(parts[0], parts[1], parts[2]);
    if let Some(units) = parts.get(3).filter(|u| !u.is_empty()) {
        field = field.with_units(units);
    }
    field.selector().map_err(|e| e.to_string())?;
    Ok(field)
}

/// Environment variable format:
/// - NWPDIFF_FIELDS: "T_850:TMP:850 mb:K;snod:SNOD:surface"
pub fn parse_fields_from_env() -> std::result::Result<Vec<FieldSpec>, String> {
    let mut fields = Vec::new();
    if let Ok(fields_env) = env::var("NWPDIFF_FIELDS")
        && !fields_env.trim().is_empty()
    {
        for field_str in fields_env.split(';') {
            let field_str = field_str.trim();
            if !field_str.is_empty() {
                fields.push(
                    parse_field_spec(field_str)
                        .map_err(|e| format!("Invalid field in NWPDIFF_FIELDS: {}", e))?,
                );
            }
        }
    }
    Ok(fields)
}

/// Merge CLI fields with environment variable fields
/// Priority: CLI arguments > Environment variables
pub fn merge_fields(cli_fields: Vec<FieldSpec>) -> std::result::Result<Vec<FieldSpec>, String> {
    if !cli_fields.is_empty() {
        return Ok(cli_fields);
    }
    parse_fields_from_env()
}

/// Builds the effective job from an optional configuration file and overrides.
///
/// Without a configuration file, `ctrl_root`, `exp_root`, `start` and `end`
/// must all be given on the command line or through the environment.
pub fn resolve_job_config(config_file: Option<&Path>, args: &MeanDiffArgs) -> Result<JobConfig> {
    let mut config = match config_file {
        Some(path) => JobConfig::from_file(path)?,
        None => {
            let require = |value: &Option<String>, flag: &str| {
                value.clone().ok_or_else(|| {
                    AnalysisError::Config(format!("{} is required when no --config is given", flag))
                })
            };
            JobConfig::new(
                &require(&args.ctrl_root, "--ctrl-root")?,
                &require(&args.exp_root, "--exp-root")?,
                &require(&args.start, "--start")?,
                &require(&args.end, "--end")?,
            )
        }
    };

    if let Some(v) = &args.ctrl_root {
        config.ctrl_root = v.clone();
    }
    if let Some(v) = &args.exp_root {
        config.exp_root = v.clone();
    }
    if let Some(v) = &args.start {
        config.start = v.clone();
    }
    if let Some(v) = &args.end {
        config.end = v.clone();
    }
    if let Some(v) = args.step_hours {
        config.step_hours = v;
    }
    if let Some(v) = &args.forecast_hour {
        config.forecast_hour = v.clone();
    }
    if let Some(v) = &args.path_template {
        config.path_template = v.clone();
    }
    if let Some(v) = &args.output_dir {
        config.output_dir = v.clone();
    }
    if let Some(v) = &args.cache_dir {
        config.cache_dir = Some(v.clone());
    }
    if let Some(v) = args.on_missing {
        config.on_missing = v;
    }
    if let Some(v) = args.region {
        config.region = v;
    }
    if let Some(v) = &args.exp_label {
        config.exp_label = v.clone();
    }
    if let Some(v) = &args.ctl_label {
        config.ctl_label = v.clone();
    }

    let fields = merge_fields(args.fields.clone()).map_err(AnalysisError::Config)?;
    if !fields.is_empty() {
        config.fields = fields;
    }

    config.validate()?;
    Ok(config)
}

/// Renders a template job in the requested format.
pub fn generate_template(template_type: &TemplateType, format: &ConfigFormat) -> Result<String> {
    let config = match template_type {
        TemplateType::Basic => {
            let mut config = JobConfig::new(
                "/path/to/ctrl_grib2",
                "/path/to/exp_grib2",
                "2024-10-25T00",
                "2024-10-26T00",
            );
            config.fields = vec![FieldSpec::new("T_850", "TMP", "850 mb").with_units("K")];
            config.exp_label = "exp".to_string();
            config
        }
        TemplateType::SnowDa => {
            let mut config = JobConfig::new(
                "/path/to/snow-da-diffs/ctrl_grib2",
                "/path/to/snow-da-diffs/snowda_grib2",
                "2024-10-25T00",
                "2025-03-24T00",
            );
            config.output_dir = "snow_da_figures".to_string();
            config.cache_dir = Some("snow_da_cache".to_string());
            config
        }
    };

    match format {
        ConfigFormat::Json => config.to_json(),
        ConfigFormat::Yaml => config.to_yaml(),
    }
}

/// Default output name for a single-field figure, e.g. `TMP_1000mb.png`.
pub fn default_plot_output(variable: &str, level: &str, suffix: &str) -> PathBuf {
    let level: String = level.chars().filter(|c| !c.is_whitespace()).collect();
    PathBuf::from(format!("{}_{}{}.png", variable, level, suffix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::tempdir;

    // Global mutex to ensure environment variable tests run sequentially
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn test_parse_field_spec() {
        let field = parse_field_spec("T_850:TMP:850 mb:K").unwrap();
        assert_eq!(field.name, "T_850");
        assert_eq!(field.short_name, "TMP");
        assert_eq!(field.level, "850 mb");
        assert_eq!(field.units.as_deref(), Some("K"));

        let field = parse_field_spec("snod:SNOD:surface").unwrap();
        assert_eq!(field.units, None);

        // Test invalid formats
        assert!(parse_field_spec("T_850:TMP").is_err());
        assert!(parse_field_spec("T_850:TMP:850 mb:K:extra").is_err());
        assert!(parse_field_spec(":TMP:850 mb").is_err());
        assert!(parse_field_spec("x:NOPE:850 mb").is_err()); // unknown short name
        assert!(parse_field_spec("x:TMP:tropopause").is_err()); // unknown level
    }

    #[test]
    fn test_environment_variable_field_parsing() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        let original = env::var("NWPDIFF_FIELDS").ok();

        unsafe {
            env::set_var("NWPDIFF_FIELDS", "T_850:TMP:850 mb:K; mslp:PRMSL:mean sea level");
        }
        let fields = parse_fields_from_env().unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1].name, "mslp");
        assert_eq!(fields[1].level, "mean sea level");

        unsafe {
            env::set_var("NWPDIFF_FIELDS", "broken");
        }
        assert!(parse_fields_from_env().is_err());

        unsafe {
            env::remove_var("NWPDIFF_FIELDS");
        }
        assert!(parse_fields_from_env().unwrap().is_empty());

        unsafe {
            if let Some(ref val) = original {
                env::set_var("NWPDIFF_FIELDS", val);
            }
        }
    }

    #[test]
    fn test_field_merging_priority() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        let original = env::var("NWPDIFF_FIELDS").ok();

        unsafe {
            env::set_var("NWPDIFF_FIELDS", "snod:SNOD:surface");
        }

        // CLI fields win over the environment
        let cli = vec![FieldSpec::new("T_2m", "TMP", "2 m above ground")];
        let merged = merge_fields(cli).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name, "T_2m");

        // Environment fields are used when the CLI gives none
        let merged = merge_fields(Vec::new()).unwrap();
        assert_eq!(merged[0].name, "snod");

        unsafe {
            env::remove_var("NWPDIFF_FIELDS");
            if let Some(ref val) = original {
                env::set_var("NWPDIFF_FIELDS", val);
            }
        }
    }

    #[test]
    fn test_resolve_job_config_overrides_file() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        let original = env::var("NWPDIFF_FIELDS").ok();
        unsafe {
            env::remove_var("NWPDIFF_FIELDS");
        }

        let dir = tempdir().unwrap();
        let path = dir.path().join("job.yaml");
        std::fs::write(&path, generate_template(&TemplateType::SnowDa, &ConfigFormat::Yaml).unwrap())
            .unwrap();

        let args = MeanDiffArgs {
            end: Some("2024-10-26T00".to_string()),
            on_missing: Some(MissingCyclePolicy::Skip),
            fields: vec![FieldSpec::new("T_500", "TMP", "500 mb")],
            ..Default::default()
        };
        let config = resolve_job_config(Some(&path), &args).unwrap();
        assert_eq!(config.start, "2024-10-25T00");
        assert_eq!(config.end, "2024-10-26T00");
        assert_eq!(config.on_missing, MissingCyclePolicy::Skip);
        assert_eq!(config.fields.len(), 1);
        assert_eq!(config.cache_dir.as_deref(), Some("snow_da_cache"));

        // file values survive when nothing overrides them
        let config = resolve_job_config(Some(&path), &MeanDiffArgs::default()).unwrap();
        assert_eq!(config.fields.len(), 4);
        assert_eq!(config.end, "2025-03-24T00");

        unsafe {
            if let Some(ref val) = original {
                env::set_var("NWPDIFF_FIELDS", val);
            }
        }
    }

    #[test]
    fn test_resolve_job_config_without_file() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();

        let missing = MeanDiffArgs {
            ctrl_root: Some("/c".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            resolve_job_config(None, &missing),
            Err(AnalysisError::Config(_))
        ));

        let args = MeanDiffArgs {
            ctrl_root: Some("/c".to_string()),
            exp_root: Some("/e".to_string()),
            start: Some("2024102500".to_string()),
            end: Some("2024102518".to_string()),
            step_hours: Some(3),
            ..Default::default()
        };
        let config = resolve_job_config(None, &args).unwrap();
        assert_eq!(config.step_hours, 3);
        assert_eq!(config.cycle_range().unwrap().len(), 7);
    }

    #[test]
    fn test_templates_parse_back() {
        for template in [TemplateType::Basic, TemplateType::SnowDa] {
            let json = generate_template(&template, &ConfigFormat::Json).unwrap();
            let from_json = JobConfig::from_json(&json).unwrap();
            let yaml = generate_template(&template, &ConfigFormat::Yaml).unwrap();
            let from_yaml = JobConfig::from_yaml(&yaml).unwrap();
            assert_eq!(from_json, from_yaml);
            assert!(from_json.validate().is_ok());
        }
    }

    #[test]
    fn test_default_plot_output() {
        assert_eq!(
            default_plot_output("TMP", "1000 mb", ""),
            PathBuf::from("TMP_1000mb.png")
        );
        assert_eq!(
            default_plot_output("PRMSL", "mean sea level", "_diff"),
            PathBuf::from("PRMSL_meansealevel_diff.png")
        );
    }
}
