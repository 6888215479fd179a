//! # nwpdiff
//!
//! Compares two numerical-weather-prediction experiments ("control" and
//! "experiment") stored as GRIB2 and NetCDF grids, and renders the results as
//! georeferenced PNG maps.
//!
//! ## Features
//!
//! - **Time-mean differences**: accumulate `experiment - control` over a cycle
//!   series with an explicit missing-cycle policy
//! - **Robust color scales**: `mean ± 3·std` for absolute fields, bounds
//!   symmetric about zero for differences
//! - **Artifact cache**: mean grids and coordinates saved as `.npy` so figures
//!   can be redrawn without re-reading the archives
//! - **Single-file workflows**: plot one field, difference two files, or draw
//!   the six cubed-sphere tiles of an FV3 surface analysis
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nwpdiff::{process_mean_diff_job, input::JobConfig};
//! use nwpdiff::render::PngRenderer;
//! use nwpdiff::source::GribOpener;
//!
//! let config = JobConfig::from_file("snow_da.yaml")?;
//! let summary = process_mean_diff_job(&config, &GribOpener, &PngRenderer, true)?;
//! println!("averaged {} cycles", summary.cycles_accumulated);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod averager;
pub mod cli;
pub mod cycles;
pub mod error;
pub mod fields;
pub mod grid;
pub mod info;
pub mod input;
pub mod log;
pub mod output;
pub mod render;
pub mod scale;
pub mod source;
pub mod workflows;


use ::log::{debug, info, warn};
use chrono::NaiveDateTime;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use crate::averager::{FieldPair, GridSeriesAverager};
use crate::cycles::CycleRange;
use crate::error::{AnalysisError, Result};
use crate::fields::FieldSelector;
use crate::grid::Coordinates;
use crate::input::{JobConfig, MissingCyclePolicy};
use crate::output::{ArtifactCache, CacheManifest, MeanDiffArtifacts};
use crate::render::{Colormap, FigureSpec, MapLayer, Renderer};
use crate::scale::ScaleBounds;
use crate::source::{GridSource, SourceOpener};

/// Timestamp format used in figure titles and the cache manifest.
pub const TITLE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Outcome of a mean-difference run.
#[derive(Debug, Clone)]
pub struct MeanDiffSummary {
    pub cycles_expected: usize,
    pub cycles_accumulated: usize,
    pub skipped_cycles: Vec<NaiveDateTime>,
    pub bounds: BTreeMap<String, ScaleBounds>,
    pub figures: Vec<PathBuf>,
}

/// Runs the full mean-difference job: accumulate, cache, then plot.
///
/// Nothing is written unless accumulation finished and every field has a
/// usable color scale.
///
/// # Arguments
///
/// * `config` - The job description
/// * `opener` - Opens each cycle's control and experiment file
/// * `renderer` - Draws one figure per field
/// * `show_progress` - Whether to draw a progress bar over cycles
///
/// # Errors
///
/// Fails with [`AnalysisError::MissingCycle`] under the `abort` policy,
/// [`AnalysisError::EmptySeries`] when no cycle was accumulated,
/// [`AnalysisError::AllMissingData`] when a field's mean has no finite value,
/// or any error raised while reading, caching or rendering.
pub fn process_mean_diff_job(
    config: &JobConfig,
    opener: &dyn SourceOpener,
    renderer: &dyn Renderer,
    show_progress: bool,
) -> Result<MeanDiffSummary> {
    config.validate()?;
    let (artifacts, skipped_cycles, cycles_expected) =
        accumulate_mean_diff(config, opener, show_progress)?;

    let plan = plan_mean_diff_figures(&artifacts, config)?;
    ArtifactCache::new(config.cache_path()).save(&artifacts)?;
    let (figures, bounds) = draw_mean_diff_figures(&plan, renderer)?;

    Ok(MeanDiffSummary {
        cycles_expected,
        cycles_accumulated: artifacts.manifest.cycles_accumulated,
        skipped_cycles,
        bounds,
        figures,
    })
}

/// Redraws the mean-difference figures from a previously written cache.
pub fn replot_from_cache(config: &JobConfig, renderer: &dyn Renderer) -> Result<MeanDiffSummary> {
    let cache = ArtifactCache::new(config.cache_path());
    info!("Re-plotting from cache {}", cache.dir().display());
    let artifacts = cache.load()?;
    let (figures, bounds) = render_mean_diffs(&artifacts, config, renderer)?;

    Ok(MeanDiffSummary {
        cycles_expected: artifacts.manifest.cycles_accumulated
            + artifacts.manifest.skipped_cycles.len(),
        cycles_accumulated: artifacts.manifest.cycles_accumulated,
        skipped_cycles: Vec::new(),
        bounds,
        figures,
    })
}

/// Walks the cycle range and returns the finalized means.
///
/// Returns the artifacts, the skipped cycles and the number of cycles in the range.
pub fn accumulate_mean_diff(
    config: &JobConfig,
    opener: &dyn SourceOpener,
    show_progress: bool,
) -> Result<(MeanDiffArtifacts, Vec<NaiveDateTime>, usize)> {
    let pb = if show_progress {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] cycle {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb
    } else {
        ProgressBar::hidden()
    };
    accumulate_mean_diff_with_progress(config, opener, &pb)
}

/// Same as [`accumulate_mean_diff`] but reports to a caller-owned bar.
///
/// The bar is cleared on success and abandoned on any error.
pub fn accumulate_mean_diff_with_progress(
    config: &JobConfig,
    opener: &dyn SourceOpener,
    pb: &ProgressBar,
) -> Result<(MeanDiffArtifacts, Vec<NaiveDateTime>, usize)> {
    let range = config.cycle_range()?;
    let selectors = config
        .fields
        .iter()
        .map(|field| Ok((field.name.clone(), field.selector()?)))
        .collect::<Result<Vec<(String, FieldSelector)>>>()?;
    let mut averager = GridSeriesAverager::new(config.fields.iter().map(|f| f.name.clone()));

    pb.set_length(range.len() as u64);
    let walked = walk_cycles(config, opener, &range, &selectors, &mut averager, pb);
    let (coordinates, skipped) = match walked {
        Ok(walked) => {
            pb.finish_and_clear();
            walked
        }
        Err(e) => {
            pb.abandon();
            return Err(e);
        }
    };

    let means = averager.finalize()?;
    let coordinates = coordinates.ok_or(AnalysisError::EmptySeries)?;
    info!(
        "Averaged {} of {} cycle(s) ({} skipped)",
        averager.count(),
        range.len(),
        skipped.len()
    );

    let manifest = CacheManifest {
        fields: config.fields.iter().map(|f| f.name.clone()).collect(),
        start: range.start.format(TITLE_TIME_FORMAT).to_string(),
        end: range.end.format(TITLE_TIME_FORMAT).to_string(),
        cycles_accumulated: averager.count(),
        skipped_cycles: skipped
            .iter()
            .map(|c| c.format(TITLE_TIME_FORMAT).to_string())
            .collect(),
        shape: coordinates.shape(),
        exp_label: config.exp_label.clone(),
        ctl_label: config.ctl_label.clone(),
    };

    Ok((
        MeanDiffArtifacts {
            coordinates,
            means,
            manifest,
        },
        skipped,
        range.len(),
    ))
}

/// Feeds every cycle of `range` to the averager.
///
/// Returns the coordinate mesh of the first accumulated cycle and the cycles
/// skipped under [`MissingCyclePolicy::Skip`].
fn walk_cycles(
    config: &JobConfig,
    opener: &dyn SourceOpener,
    range: &CycleRange,
    selectors: &[(String, FieldSelector)],
    averager: &mut GridSeriesAverager,
    pb: &ProgressBar,
) -> Result<(Option<Coordinates>, Vec<NaiveDateTime>)> {
    let layout = config.layout();
    let mut coordinates: Option<Coordinates> = None;
    let mut skipped = Vec::new();

    for cycle in range {
        pb.set_message(cycle.format("%Y%m%d%H").to_string());
        let ctrl_path = layout.path_for(&config.ctrl_root, cycle);
        let exp_path = layout.path_for(&config.exp_root, cycle);

        let (ctrl, exp) = match open_cycle(opener, cycle, &ctrl_path, &exp_path) {
            Ok(pair) => pair,
            Err(AnalysisError::MissingCycle { cycle, path })
                if config.on_missing == MissingCyclePolicy::Skip =>
            {
                pb.suspend(|| warn!("Skipping cycle {}: {} not found", cycle, path.display()));
                skipped.push(cycle);
                pb.inc(1);
                continue;
            }
            Err(e) => return Err(e),
        };

        let mut values = HashMap::with_capacity(selectors.len());
        for (name, selector) in selectors {
            let experiment = exp.read_field(selector)?.values;
            let control = ctrl.read_field(selector)?.values;
            values.insert(name.clone(), FieldPair::new(experiment, control));
        }

        if coordinates.is_none() {
            if let Some((_, selector)) = selectors.first() {
                let coords = exp.read_coordinates(selector)?;
                debug!("Captured {:?} coordinate mesh from {}", coords.shape(), exp.path().display());
                coordinates = Some(coords);
            }
        }

        averager.accumulate(cycle, &values)?;
        pb.inc(1);
    }
    Ok((coordinates, skipped))
}

/// Opens both sources of a cycle, mapping a missing file to [`AnalysisError::MissingCycle`].
fn open_cycle(
    opener: &dyn SourceOpener,
    cycle: NaiveDateTime,
    ctrl_path: &std::path::Path,
    exp_path: &std::path::Path,
) -> Result<(Box<dyn GridSource>, Box<dyn GridSource>)> {
    let open = |path: &std::path::Path| {
        opener.open(path).map_err(|e| match e {
            AnalysisError::SourceNotFound(path) => AnalysisError::MissingCycle { cycle, path },
            other => other,
        })
    };
    let ctrl = open(ctrl_path)?;
    let exp = open(exp_path)?;
    Ok((ctrl, exp))
}

/// A mean-difference figure whose scale and layer are already resolved.
#[derive(Debug, Clone)]
pub struct MeanDiffFigure<'a> {
    pub name: String,
    pub layer: MapLayer<'a>,
    pub figure: FigureSpec,
    pub output: PathBuf,
}

/// Resolves the scale bounds and map layer of every field before anything is drawn.
///
/// Fields without a mean in `artifacts` are skipped with a warning. Fails on
/// the first field whose mean has no finite value.
pub fn plan_mean_diff_figures<'a>(
    artifacts: &'a MeanDiffArtifacts,
    config: &JobConfig,
) -> Result<Vec<MeanDiffFigure<'a>>> {
    let manifest = &artifacts.manifest;
    let mut plan = Vec::with_capacity(config.fields.len());

    for field in &config.fields {
        let Some(mean) = artifacts.means.get(&field.name) else {
            warn!("No cached mean for field '{}'; skipping its figure", field.name);
            continue;
        };
        let bounds = GridSeriesAverager::compute_scale_bounds(mean, false)?;
        let title = format!(
            "{} {}-{} mean {}-{}",
            field.name, manifest.exp_label, manifest.ctl_label, manifest.start, manifest.end
        );
        let figure = FigureSpec::new(title, field.units.clone().unwrap_or_default(), bounds)
            .with_colormap(Colormap::Coolwarm)
            .with_region(config.region);

        plan.push(MeanDiffFigure {
            name: field.name.clone(),
            layer: MapLayer::new(mean, &artifacts.coordinates)?,
            figure,
            output: config.figure_path(&field.name),
        });
    }
    Ok(plan)
}

/// Draws every planned figure and collects its path and bounds.
pub fn draw_mean_diff_figures(
    plan: &[MeanDiffFigure<'_>],
    renderer: &dyn Renderer,
) -> Result<(Vec<PathBuf>, BTreeMap<String, ScaleBounds>)> {
    let mut figures = Vec::with_capacity(plan.len());
    let mut all_bounds = BTreeMap::new();
    for planned in plan {
        renderer.render(&[planned.layer], &planned.figure, &planned.output)?;
        all_bounds.insert(planned.name.clone(), planned.figure.bounds);
        figures.push(planned.output.clone());
    }
    Ok((figures, all_bounds))
}

/// Draws one `<name>_diff.png` per field of the artifacts.
pub fn render_mean_diffs(
    artifacts: &MeanDiffArtifacts,
    config: &JobConfig,
    renderer: &dyn Renderer,
) -> Result<(Vec<PathBuf>, BTreeMap<String, ScaleBounds>)> {
    let plan = plan_mean_diff_figures(artifacts, config)?;
    draw_mean_diff_figures(&plan, renderer)
}
