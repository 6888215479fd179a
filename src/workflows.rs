//! # Single-Run Workflows
//!
//! The figure-producing commands that do not walk a cycle series:
//!
//! - [`plot_field`]: one field from one file, `mean ± 3·std` scale
//! - [`plot_difference`]: `file2 - file1` for one field, scale symmetric about zero
//! - [`plot_tiles`]: a NetCDF variable drawn over the six cubed-sphere tiles

use log::{info, warn};
use std::path::{Path, PathBuf};

use crate::error::{AnalysisError, Result};
use crate::fields::FieldSelector;
use crate::grid::{Coordinates, Grid};
use crate::render::{Colormap, FigureSpec, MapLayer, Region, Renderer};
use crate::scale::{ScaleBounds, compute_scale_bounds};
use crate::source::{FieldData, NetcdfSource, SourceOpener};

/// Contour levels used by the single-file plots.
pub const DEFAULT_CONTOUR_LEVELS: usize = 21;

const NOT_AVAILABLE: &str = "n/a";

/// Options shared by [`plot_field`] and [`plot_difference`].
#[derive(Debug, Clone, PartialEq)]
pub struct PlotOptions {
    pub variable: String,
    pub level: String,
    pub output: PathBuf,
    pub region: Region,
    pub title_prefix: String,
    pub colormap: Colormap,
    pub levels: Option<usize>,
}

impl PlotOptions {
    pub fn new(variable: &str, level: &str, output: impl Into<PathBuf>) -> Self {
        PlotOptions {
            variable: variable.to_string(),
            level: level.to_string(),
            output: output.into(),
            region: Region::Global,
            title_prefix: "GRIB file".to_string(),
            colormap: Colormap::Viridis,
            levels: Some(DEFAULT_CONTOUR_LEVELS),
        }
    }

    fn title(&self, field: &FieldData) -> String {
        format!(
            "{}: {} at {} (Valid: {}, Lead: {})",
            self.title_prefix,
            self.variable,
            self.level,
            field.valid_time.as_deref().unwrap_or(NOT_AVAILABLE),
            field.lead_time.as_deref().unwrap_or(NOT_AVAILABLE)
        )
    }
}

/// What a workflow drew.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotOutcome {
    pub output: PathBuf,
    pub title: String,
    pub colorbar_label: String,
    pub bounds: ScaleBounds,
}

/// Plots one field of one file.
pub fn plot_field(
    path: &Path,
    options: &PlotOptions,
    opener: &dyn SourceOpener,
    renderer: &dyn Renderer,
) -> Result<PlotOutcome> {
    let selector = FieldSelector::new(&options.variable, &options.level)?;
    let source = opener.open(path)?;
    let field = source.read_field(&selector)?;
    let coords = source.read_coordinates(&selector)?;

    let bounds = compute_scale_bounds(&field.values, false)?;
    let title = options.title(&field);
    let label = field.units.clone().unwrap_or_default();
    let figure = FigureSpec::new(title.clone(), label.clone(), bounds)
        .with_colormap(options.colormap)
        .with_region(options.region)
        .with_levels(options.levels);

    renderer.render(&[MapLayer::new(&field.values, &coords)?], &figure, &options.output)?;
    Ok(PlotOutcome {
        output: options.output.clone(),
        title,
        colorbar_label: label,
        bounds,
    })
}

/// Plots `file2 - file1` for one field.
///
/// Both files must hold the field on the same grid; coordinates and time
/// metadata come from the first file.
pub fn plot_difference(
    file1: &Path,
    file2: &Path,
    options: &PlotOptions,
    opener: &dyn SourceOpener,
    renderer: &dyn Renderer,
) -> Result<PlotOutcome> {
    let selector = FieldSelector::new(&options.variable, &options.level)?;
    let first = opener.open(file1)?;
    let second = opener.open(file2)?;

    let field1 = first.read_field(&selector)?;
    let field2 = second.read_field(&selector)?;
    let coords = first.read_coordinates(&selector)?;
    let diff = difference(&field1.values, &field2.values, &options.variable)?;

    let bounds = compute_scale_bounds(&diff, true)?;
    let title = options.title(&field1);
    let label = format!("Difference ({})", field1.units.as_deref().unwrap_or(""));
    let figure = FigureSpec::new(title.clone(), label.clone(), bounds)
        .with_colormap(options.colormap)
        .with_region(options.region)
        .with_levels(options.levels);

    renderer.render(&[MapLayer::new(&diff, &coords)?], &figure, &options.output)?;
    Ok(PlotOutcome {
        output: options.output.clone(),
        title,
        colorbar_label: label,
        bounds,
    })
}

/// `second - first`, checking shapes.
pub fn difference(first: &Grid, second: &Grid, field: &str) -> Result<Grid> {
    if first.dim() != second.dim() {
        return Err(AnalysisError::ShapeMismatch {
            field: field.to_string(),
            expected: first.dim(),
            found: second.dim(),
        });
    }
    Ok(second - first)
}

/// Options for [`plot_tiles`].
#[derive(Debug, Clone, PartialEq)]
pub struct TileOptions {
    pub variable: String,
    pub lat_variable: String,
    pub lon_variable: String,
    pub output: PathBuf,
    pub region: Region,
    pub bounds: ScaleBounds,
    pub colormap: Colormap,
    pub title: String,
    pub colorbar_label: String,
    pub tiles: Vec<u8>,
}

impl TileOptions {
    /// Global snow liquid defaults: `-1000..1000` mm on `bwr`.
    pub fn snow_liquid_global(output: impl Into<PathBuf>) -> Self {
        TileOptions {
            variable: "snodl".to_string(),
            lat_variable: "geolat".to_string(),
            lon_variable: "geolon".to_string(),
            output: output.into(),
            region: Region::Global,
            bounds: ScaleBounds::new(-1000.0, 1000.0),
            colormap: Colormap::Bwr,
            title: "FV3 Snow Depth Liquid (snodl) - Global Map".to_string(),
            colorbar_label: "Snow Liquid (mm)".to_string(),
            tiles: (1..=6).collect(),
        }
    }

    /// CONUS snow defaults: `0..500` mm on `blues`.
    pub fn snow_liquid_conus(output: impl Into<PathBuf>) -> Self {
        TileOptions {
            region: Region::Conus,
            bounds: ScaleBounds::new(0.0, 500.0),
            colormap: Colormap::Blues,
            title: "FV3 Snow Depth (snodl) - US Map".to_string(),
            colorbar_label: "Snow (mm)".to_string(),
            ..Self::snow_liquid_global(output)
        }
    }
}

/// Tile file name for a prefix, e.g. `20250101.000000.sfcanl_data.` + 3
/// gives `20250101.000000.sfcanl_data.tile3.nc`.
pub fn tile_path(prefix: &str, tile: u8) -> PathBuf {
    PathBuf::from(format!("{}tile{}.nc", prefix, tile))
}

/// Draws `variable` from every available tile onto one figure.
///
/// A tile whose data or orography file is missing is logged and left out.
/// Fails with [`AnalysisError::SourceNotFound`] when no tile could be read.
pub fn plot_tiles(
    data_prefix: &str,
    oro_prefix: &str,
    options: &TileOptions,
    renderer: &dyn Renderer,
) -> Result<PlotOutcome> {
    let mut tiles: Vec<(Grid, Coordinates)> = Vec::new();

    for &tile in &options.tiles {
        let data_path = tile_path(data_prefix, tile);
        let oro_path = tile_path(oro_prefix, tile);
        if !data_path.exists() || !oro_path.exists() {
            warn!(
                "Missing file for tile {}: {} or {}",
                tile,
                data_path.display(),
                oro_path.display()
            );
            continue;
        }

        let values = NetcdfSource::open(&data_path)?.read_variable(&options.variable)?.values;
        let coords = NetcdfSource::open(&oro_path)?
            .read_mesh(&options.lat_variable, &options.lon_variable)?;
        if values.dim() != coords.shape() {
            return Err(AnalysisError::ShapeMismatch {
                field: format!("{} tile{}", options.variable, tile),
                expected: coords.shape(),
                found: values.dim(),
            });
        }
        tiles.push((values, coords));
    }

    if tiles.is_empty() {
        return Err(AnalysisError::SourceNotFound(tile_path(data_prefix, 1)));
    }
    info!("Drawing {} of {} tile(s)", tiles.len(), options.tiles.len());

    let layers = tiles
        .iter()
        .map(|(values, coords)| MapLayer::new(values, coords))
        .collect::<Result<Vec<_>>>()?;
    let figure = FigureSpec::new(options.title.clone(), options.colorbar_label.clone(), options.bounds)
        .with_colormap(options.colormap)
        .with_region(options.region);
    renderer.render(&layers, &figure, &options.output)?;

    Ok(PlotOutcome {
        output: options.output.clone(),
        title: options.title.clone(),
        colorbar_label: options.colorbar_label.clone(),
        bounds: options.bounds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_difference_is_second_minus_first() {
        let first = array![[1.0, 2.0], [3.0, f64::NAN]];
        let second = array![[2.0, 2.0], [0.0, 1.0]];
        let diff = difference(&first, &second, "TMP").unwrap();
        assert_eq!(diff[[0, 0]], 1.0);
        assert_eq!(diff[[0, 1]], 0.0);
        assert_eq!(diff[[1, 0]], -3.0);
        assert!(diff[[1, 1]].is_nan());

        let wrong = Grid::zeros((3, 2));
        assert!(matches!(
            difference(&first, &wrong, "TMP"),
            Err(AnalysisError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_title_format() {
        let options = PlotOptions::new("TMP", "1000 mb", "tmp.png");
        let field = FieldData {
            values: Grid::zeros((1, 1)),
            units: Some("K".to_string()),
            reference_time: None,
            lead_time: Some("6 Hour".to_string()),
            valid_time: None,
        };
        assert_eq!(
            options.title(&field),
            "GRIB file: TMP at 1000 mb (Valid: n/a, Lead: 6 Hour)"
        );

        let field = FieldData {
            reference_time: Some("2024-10-25 00:00:00".to_string()),
            valid_time: Some("2024-10-25 06:00:00".to_string()),
            ..field
        };
        assert_eq!(
            options.title(&field),
            "GRIB file: TMP at 1000 mb (Valid: 2024-10-25 06:00:00, Lead: 6 Hour)"
        );
    }

    #[test]
    fn test_tile_path_and_defaults() {
        assert_eq!(
            tile_path("20250101.000000.sfcanl_data.", 3),
            PathBuf::from("20250101.000000.sfcanl_data.tile3.nc")
        );
        let global = TileOptions::snow_liquid_global("g.png");
        assert_eq!(global.tiles, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(global.colormap, Colormap::Bwr);
        assert_eq!(global.title, "FV3 Snow Depth Liquid (snodl) - Global Map");
        let conus = TileOptions::snow_liquid_conus("us.png");
        assert_eq!(conus.bounds.as_tuple(), (0.0, 500.0));
        assert_eq!(conus.variable, "snodl");
        assert_eq!(conus.region, Region::Conus);
        assert_eq!(conus.title, "FV3 Snow Depth (snodl) - US Map");
    }
}
