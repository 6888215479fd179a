//! # Map Rendering Module
//!
//! Draws gridded fields onto a Plate Carrée canvas and writes them as PNG.
//!
//! ## Features
//!
//! - **Colormaps**: `viridis`, `coolwarm`, `bwr` and `blues`, sampled by
//!   linear interpolation between fixed color stops
//! - **Regions**: global and CONUS extents; longitudes in `0..360` are
//!   wrapped to `-180..180`
//! - **Discrete levels**: optional quantization into `levels - 1` bands, out
//!   of range values clamped to the end bands
//! - **Colorbar**: vertical bar appended to the right of the map, with low,
//!   middle and high tick values and the label underneath
//! - **Title**: drawn in a band above the map, shrunk to fit the image width
//! - **Sidecar metadata**: title, colorbar label, bounds, colormap and region
//!   are written to `<output>.json` next to the image
//!
//! Each grid point is splatted as a rectangle sized from the grid spacing, so
//! curvilinear meshes (cubed-sphere tiles) render without resampling. NaN
//! samples stay transparent.

use clap::ValueEnum;
use image::{ImageBuffer, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use log::{debug, info, warn};
use rusttype::{Font, Scale};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{AnalysisError, Result};
use crate::grid::{Coordinates, Grid};
use crate::scale::ScaleBounds;

/// Default map width in pixels; height follows the region's aspect ratio.
pub const DEFAULT_MAP_WIDTH: u32 = 1440;

const COLORBAR_GAP: u32 = 16;
const COLORBAR_BAR_WIDTH: u32 = 24;
const COLORBAR_MARGIN: u32 = 16;
const TICK_LENGTH: u32 = 4;
const TICK_COLUMN: u32 = 84;
const TITLE_BAND: u32 = 32;
const LABEL_BAND: u32 = 24;

const TITLE_FONT_SIZE: f32 = 20.0;
const LABEL_FONT_SIZE: f32 = 15.0;
const TICK_FONT_SIZE: f32 = 13.0;

const FONT_DATA: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn transparent() -> Self {
        Self { r: 0, g: 0, b: 0, a: 0 }
    }

    fn lerp(self, other: Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Color {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }

    fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, self.a])
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Colormap {
    /// Perceptually uniform, dark purple to yellow
    #[default]
    Viridis,
    /// Diverging blue to red through light grey
    Coolwarm,
    /// Diverging blue to red through white
    Bwr,
    /// Sequential white to dark blue
    Blues,
}

const VIRIDIS: &[(f64, Color)] = &[
    (0.0, Color::rgb(68, 1, 84)),
    (0.125, Color::rgb(71, 44, 122)),
    (0.25, Color::rgb(59, 81, 139)),
    (0.375, Color::rgb(44, 113, 142)),
    (0.5, Color::rgb(33, 144, 141)),
    (0.625, Color::rgb(39, 173, 129)),
    (0.75, Color::rgb(92, 200, 99)),
    (0.875, Color::rgb(170, 220, 50)),
    (1.0, Color::rgb(253, 231, 37)),
];

const COOLWARM: &[(f64, Color)] = &[
    (0.0, Color::rgb(59, 76, 192)),
    (0.25, Color::rgb(141, 176, 254)),
    (0.5, Color::rgb(221, 221, 221)),
    (0.75, Color::rgb(244, 154, 123)),
    (1.0, Color::rgb(180, 4, 38)),
];

const BWR: &[(f64, Color)] = &[
    (0.0, Color::rgb(0, 0, 255)),
    (0.5, Color::rgb(255, 255, 255)),
    (1.0, Color::rgb(255, 0, 0)),
];

const BLUES: &[(f64, Color)] = &[
    (0.0, Color::rgb(247, 251, 255)),
    (0.25, Color::rgb(198, 219, 239)),
    (0.5, Color::rgb(107, 174, 214)),
    (0.75, Color::rgb(33, 113, 181)),
    (1.0, Color::rgb(8, 48, 107)),
];

impl Colormap {
    fn stops(&self) -> &'static [(f64, Color)] {
        match self {
            Colormap::Viridis => VIRIDIS,
            Colormap::Coolwarm => COOLWARM,
            Colormap::Bwr => BWR,
            Colormap::Blues => BLUES,
        }
    }

    /// Color at normalized position `t` (clamped to `[0, 1]`).
    pub fn color_at(&self, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        let stops = self.stops();
        for pair in stops.windows(2) {
            let (t0, c0) = pair[0];
            let (t1, c1) = pair[1];
            if t <= t1 {
                return c0.lerp(c1, (t - t0) / (t1 - t0));
            }
        }
        stops[stops.len() - 1].1
    }

    pub fn name(&self) -> &'static str {
        match self {
            Colormap::Viridis => "viridis",
            Colormap::Coolwarm => "coolwarm",
            Colormap::Bwr => "bwr",
            Colormap::Blues => "blues",
        }
    }
}

impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Colormap {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "viridis" => Ok(Colormap::Viridis),
            "coolwarm" => Ok(Colormap::Coolwarm),
            "bwr" => Ok(Colormap::Bwr),
            "blues" => Ok(Colormap::Blues),
            other => Err(AnalysisError::Config(format!(
                "unknown colormap '{}' (expected viridis, coolwarm, bwr or blues)",
                other
            ))),
        }
    }
}

/// Named map extents.
#[derive(ValueEnum, Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    /// Whole globe
    #[default]
    Global,
    /// Contiguous United States
    Conus,
}

impl Region {
    pub fn extent(&self) -> Extent {
        match self {
            Region::Global => Extent::new(-180.0, 180.0, -90.0, 90.0),
            Region::Conus => Extent::new(-130.0, -65.0, 23.0, 50.0),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Region::Global => "global",
            Region::Conus => "conus",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A longitude/latitude box in degrees, longitudes in `-180..180`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl Extent {
    pub fn new(min_lon: f64, max_lon: f64, min_lat: f64, max_lat: f64) -> Self {
        Extent {
            min_lon,
            max_lon,
            min_lat,
            max_lat,
        }
    }

    pub fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        let lon = wrap_longitude(lon);
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }
}

/// Maps a longitude into `[-180, 180)`.
pub fn wrap_longitude(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    // keep the eastern edge of a 0..360 grid on the right side of the map
    if wrapped == -180.0 && lon > 0.0 { 180.0 } else { wrapped }
}

/// One field to draw with its mesh.
#[derive(Debug, Clone, Copy)]
pub struct MapLayer<'a> {
    pub values: &'a Grid,
    pub coords: &'a Coordinates,
}

impl<'a> MapLayer<'a> {
    pub fn new(values: &'a Grid, coords: &'a Coordinates) -> Result<Self> {
        if values.dim() != coords.shape() {
            return Err(AnalysisError::ShapeMismatch {
                field: "layer".to_string(),
                expected: coords.shape(),
                found: values.dim(),
            });
        }
        Ok(MapLayer { values, coords })
    }
}

/// Everything about a figure except the data.
#[derive(Debug, Clone, PartialEq)]
pub struct FigureSpec {
    pub title: String,
    pub colorbar_label: String,
    pub bounds: ScaleBounds,
    pub colormap: Colormap,
    pub region: Region,
    /// Number of contour levels; `None` renders a continuous mesh.
    pub levels: Option<usize>,
    pub map_width: u32,
}

impl FigureSpec {
    pub fn new(title: impl Into<String>, colorbar_label: impl Into<String>, bounds: ScaleBounds) -> Self {
        FigureSpec {
            title: title.into(),
            colorbar_label: colorbar_label.into(),
            bounds,
            colormap: Colormap::default(),
            region: Region::default(),
            levels: None,
            map_width: DEFAULT_MAP_WIDTH,
        }
    }

    pub fn with_colormap(mut self, colormap: Colormap) -> Self {
        self.colormap = colormap;
        self
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    pub fn with_levels(mut self, levels: Option<usize>) -> Self {
        self.levels = levels;
        self
    }

    pub fn with_map_width(mut self, map_width: u32) -> Self {
        self.map_width = map_width;
        self
    }

    /// Color for a data value, honoring bounds, levels and colormap.
    pub fn color_for(&self, value: f64) -> Color {
        let t = self.bounds.normalize(value);
        self.colormap.color_at(quantize(t, self.levels))
    }

    fn map_size(&self) -> (u32, u32) {
        let extent = self.region.extent();
        let height = (self.map_width as f64 * extent.lat_span() / extent.lon_span()).round();
        (self.map_width.max(1), (height as u32).max(1))
    }
}

/// Snaps `t` to the center of its band when `levels` is set.
fn quantize(t: f64, levels: Option<usize>) -> f64 {
    match levels {
        Some(levels) if levels >= 2 => {
            let bands = (levels - 1) as f64;
            let band = (t * bands).floor().min(bands - 1.0).max(0.0);
            (band + 0.5) / bands
        }
        _ => t,
    }
}

/// Figure metadata persisted beside each image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureMetadata {
    pub title: String,
    pub colorbar_label: String,
    pub bounds: ScaleBounds,
    pub colormap: Colormap,
    pub region: Region,
    pub levels: Option<usize>,
    pub image: String,
}

pub fn sidecar_path(output: &Path) -> PathBuf {
    let mut path = output.as_os_str().to_owned();
    path.push(".json");
    PathBuf::from(path)
}

pub trait Renderer {
    /// Draws `layers` in order (later layers on top) and writes the figure to `output`.
    fn render(&self, layers: &[MapLayer<'_>], figure: &FigureSpec, output: &Path) -> Result<()>;
}

/// Writes figures as RGBA PNG files plus a JSON sidecar.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngRenderer;

impl PngRenderer {
    /// Rasterizes the figure without touching the filesystem.
    ///
    /// The map sits below a title band and above a band holding the colorbar
    /// label; the colorbar and its tick values are to the right of the map.
    pub fn rasterize(&self, layers: &[MapLayer<'_>], figure: &FigureSpec) -> RgbaImage {
        let (map_w, map_h) = figure.map_size();
        let total_w = map_w + COLORBAR_GAP + COLORBAR_BAR_WIDTH + TICK_COLUMN;
        let total_h = TITLE_BAND + map_h + LABEL_BAND;
        let mut img: RgbaImage = ImageBuffer::from_pixel(total_w, total_h, Color::transparent().to_rgba());

        for layer in layers {
            draw_layer(&mut img, layer, figure, map_w, map_h);
        }
        let ticks = draw_colorbar(&mut img, figure, map_w, map_h);

        match Font::try_from_bytes(FONT_DATA) {
            Some(font) => draw_annotations(&mut img, &font, figure, map_w, map_h, &ticks),
            None => warn!("Failed to load font; '{}' is drawn without text", figure.title),
        }
        img
    }
}

impl Renderer for PngRenderer {
    fn render(&self, layers: &[MapLayer<'_>], figure: &FigureSpec, output: &Path) -> Result<()> {
        let img = self.rasterize(layers, figure);
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        img.save_with_format(output, ImageFormat::Png)?;

        let metadata = FigureMetadata {
            title: figure.title.clone(),
            colorbar_label: figure.colorbar_label.clone(),
            bounds: figure.bounds,
            colormap: figure.colormap,
            region: figure.region,
            levels: figure.levels,
            image: output.display().to_string(),
        };
        fs::write(sidecar_path(output), serde_json::to_string_pretty(&metadata)?)?;
        info!("Wrote {} ({})", output.display(), figure.title);
        Ok(())
    }
}

fn draw_layer(img: &mut RgbaImage, layer: &MapLayer<'_>, figure: &FigureSpec, map_w: u32, map_h: u32) {
    let extent = figure.region.extent();
    let px_per_lon = map_w as f64 / extent.lon_span();
    let px_per_lat = map_h as f64 / extent.lat_span();
    let (dlon, dlat) = grid_spacing(layer.coords);
    let half_w = ((dlon * px_per_lon) / 2.0).ceil().max(0.0) as i64;
    let half_h = ((dlat * px_per_lat) / 2.0).ceil().max(0.0) as i64;
    debug!(
        "Splatting {:?} grid, spacing {:.4}x{:.4} deg, footprint {}x{} px",
        layer.values.dim(),
        dlon,
        dlat,
        2 * half_w + 1,
        2 * half_h + 1
    );

    let points = layer
        .values
        .iter()
        .zip(layer.coords.lats.iter())
        .zip(layer.coords.lons.iter());
    for ((&value, &lat), &lon) in points {
        if value.is_nan() {
            continue;
        }
        let lon = wrap_longitude(lon);
        let cx = ((lon - extent.min_lon) * px_per_lon).floor() as i64;
        let cy = ((extent.max_lat - lat) * px_per_lat).floor() as i64;
        if cx + half_w < 0 || cy + half_h < 0 || cx - half_w >= map_w as i64 || cy - half_h >= map_h as i64 {
            continue;
        }
        let color = figure.color_for(value).to_rgba();
        let x0 = (cx - half_w).max(0);
        let x1 = (cx + half_w).min(map_w as i64 - 1);
        let y0 = (cy - half_h).max(0);
        let y1 = (cy + half_h).min(map_h as i64 - 1);
        for y in y0..=y1 {
            for x in x0..=x1 {
                img.put_pixel(x as u32, TITLE_BAND + y as u32, color);
            }
        }
    }
}

/// A colorbar tick: image row and the value it marks.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Tick {
    y: u32,
    value: f64,
}

/// Draws the bar with tick marks and returns the ticks, high value first.
fn draw_colorbar(img: &mut RgbaImage, figure: &FigureSpec, map_w: u32, map_h: u32) -> Vec<Tick> {
    let x0 = map_w + COLORBAR_GAP;
    let x1 = x0 + COLORBAR_BAR_WIDTH;
    let margin = COLORBAR_MARGIN.min(map_h / 4);
    let top = TITLE_BAND + margin;
    let bottom = TITLE_BAND + map_h - margin;
    if bottom <= top + 1 {
        return Vec::new();
    }
    let black = Color::rgb(0, 0, 0).to_rgba();
    let span = (bottom - top - 1) as f64;
    for y in top..bottom {
        let t = 1.0 - (y - top) as f64 / span;
        let color = figure.colormap.color_at(quantize(t, figure.levels)).to_rgba();
        for x in x0..x1 {
            let on_border = x == x0 || x == x1 - 1 || y == top || y == bottom - 1;
            img.put_pixel(x, y, if on_border { black } else { color });
        }
    }

    let (low, high) = figure.bounds.as_tuple();
    let ticks = vec![
        Tick { y: top, value: high },
        Tick { y: top + (bottom - 1 - top) / 2, value: (low + high) / 2.0 },
        Tick { y: bottom - 1, value: low },
    ];
    for tick in &ticks {
        for x in x1..(x1 + TICK_LENGTH).min(img.width()) {
            img.put_pixel(x, tick.y, black);
        }
    }
    ticks
}

/// Writes the title, the tick values and the colorbar label.
fn draw_annotations(
    img: &mut RgbaImage,
    font: &Font<'_>,
    figure: &FigureSpec,
    map_w: u32,
    map_h: u32,
    ticks: &[Tick],
) {
    let black = Color::rgb(0, 0, 0).to_rgba();
    let width = img.width() as i32;

    if !figure.title.is_empty() {
        let mut scale = Scale::uniform(TITLE_FONT_SIZE);
        let (mut text_w, mut text_h) = text_size(scale, font, &figure.title);
        let room = width - 8;
        if text_w > room && text_w > 0 {
            let shrink = room as f32 / text_w as f32;
            scale = Scale::uniform((TITLE_FONT_SIZE * shrink).max(6.0));
            (text_w, text_h) = text_size(scale, font, &figure.title);
        }
        let x = ((width - text_w) / 2).max(0);
        let y = ((TITLE_BAND as i32 - text_h) / 2).max(0);
        draw_text_mut(img, black, x, y, scale, font, &figure.title);
    }

    let tick_scale = Scale::uniform(TICK_FONT_SIZE);
    let tick_x = (map_w + COLORBAR_GAP + COLORBAR_BAR_WIDTH + TICK_LENGTH + 2) as i32;
    for tick in ticks {
        let text = format_tick(tick.value);
        let (_, text_h) = text_size(tick_scale, font, &text);
        draw_text_mut(img, black, tick_x, tick.y as i32 - text_h / 2, tick_scale, font, &text);
    }

    if !figure.colorbar_label.is_empty() {
        let scale = Scale::uniform(LABEL_FONT_SIZE);
        let (text_w, text_h) = text_size(scale, font, &figure.colorbar_label);
        let bar_center = (map_w + COLORBAR_GAP + COLORBAR_BAR_WIDTH / 2) as i32;
        let x = (bar_center - text_w / 2).clamp(0, (width - text_w).max(0));
        let y = (TITLE_BAND + map_h) as i32 + (LABEL_BAND as i32 - text_h) / 2;
        draw_text_mut(img, black, x, y, scale, font, &figure.colorbar_label);
    }
}

/// Formats a colorbar tick: plain decimals for ordinary magnitudes, scientific
/// notation for very small or very large ones.
fn format_tick(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-2..1e4).contains(&magnitude) {
        return format!("{:.2e}", value);
    }
    let text = format!("{:.3}", value);
    match text.trim_end_matches('0').trim_end_matches('.') {
        "-0" => "0".to_string(),
        trimmed => trimmed.to_string(),
    }
}

/// Typical spacing of the mesh in degrees, as the median of neighbor deltas.
fn grid_spacing(coords: &Coordinates) -> (f64, f64) {
    let (rows, cols) = coords.shape();
    let stride_r = (rows / 64).max(1);
    let stride_c = (cols / 64).max(1);
    let mut dlons = Vec::new();
    let mut dlats = Vec::new();

    for i in (0..rows).step_by(stride_r) {
        for j in (0..cols).step_by(stride_c) {
            let lon = coords.lons[[i, j]];
            let lat = coords.lats[[i, j]];
            if j + 1 < cols {
                dlons.push(lon_delta(lon, coords.lons[[i, j + 1]]));
                dlats.push((coords.lats[[i, j + 1]] - lat).abs());
            }
            if i + 1 < rows {
                dlons.push(lon_delta(lon, coords.lons[[i + 1, j]]));
                dlats.push((coords.lats[[i + 1, j]] - lat).abs());
            }
        }
    }

    (median_nonzero(dlons), median_nonzero(dlats))
}

fn lon_delta(a: f64, b: f64) -> f64 {
    let d = (a - b).abs() % 360.0;
    d.min(360.0 - d)
}

fn median_nonzero(mut values: Vec<f64>) -> f64 {
    values.retain(|v| v.is_finite() && *v > 1e-9);
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    values[values.len() / 2]
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use tempfile::tempdir;

    #[test]
    fn test_colormap_endpoints() {
        assert_eq!(Colormap::Viridis.color_at(0.0), Color::rgb(68, 1, 84));
        assert_eq!(Colormap::Viridis.color_at(1.0), Color::rgb(253, 231, 37));
        assert_eq!(Colormap::Bwr.color_at(0.5), Color::rgb(255, 255, 255));
        assert_eq!(Colormap::Coolwarm.color_at(-3.0), Colormap::Coolwarm.color_at(0.0));
        assert_eq!(Colormap::Blues.color_at(7.0), Color::rgb(8, 48, 107));
    }

    #[test]
    fn test_colormap_from_str() {
        assert_eq!("CoolWarm".parse::<Colormap>().unwrap(), Colormap::Coolwarm);
        assert_eq!("blues".parse::<Colormap>().unwrap(), Colormap::Blues);
        assert!("jet".parse::<Colormap>().is_err());
    }

    #[test]
    fn test_quantize_bands() {
        // 21 levels -> 20 bands
        assert!((quantize(0.0, Some(21)) - 0.025).abs() < 1e-12);
        assert!((quantize(1.0, Some(21)) - 0.975).abs() < 1e-12);
        assert!((quantize(0.51, Some(21)) - 0.525).abs() < 1e-12);
        assert_eq!(quantize(0.3, None), 0.3);
        assert_eq!(quantize(0.3, Some(1)), 0.3);
    }

    #[test]
    fn test_wrap_longitude() {
        assert_eq!(wrap_longitude(230.0), -130.0);
        assert_eq!(wrap_longitude(295.0), -65.0);
        assert_eq!(wrap_longitude(-75.5), -75.5);
        assert_eq!(wrap_longitude(0.0), 0.0);
        assert_eq!(wrap_longitude(359.75), -0.25);
        assert!(Region::Conus.extent().contains(260.0, 40.0));
        assert!(!Region::Conus.extent().contains(10.0, 40.0));
    }

    #[test]
    fn test_grid_spacing_regular_mesh() {
        let coords = Coordinates::from_axes(&[90.0, 89.75, 89.5], &[0.0, 0.25, 0.5, 359.75]);
        let (dlon, dlat) = grid_spacing(&coords);
        assert!((dlon - 0.25).abs() < 1e-9);
        assert!((dlat - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_rasterize_places_points_and_leaves_nan_transparent() {
        let coords = Coordinates::from_axes(&[45.0, -45.0], &[-90.0, 90.0]);
        let values = array![[0.0, 1.0], [f64::NAN, 0.5]];
        let layer = MapLayer::new(&values, &coords).unwrap();
        let figure = FigureSpec::new("t", "K", ScaleBounds::new(0.0, 1.0)).with_map_width(360);

        let img = PngRenderer.rasterize(&[layer], &figure);
        assert_eq!(img.height(), TITLE_BAND + 180 + LABEL_BAND);
        assert_eq!(img.width(), 360 + COLORBAR_GAP + COLORBAR_BAR_WIDTH + TICK_COLUMN);
        assert_eq!(*img.get_pixel(90, TITLE_BAND + 45), Rgba([68, 1, 84, 255]));
        assert_eq!(*img.get_pixel(270, TITLE_BAND + 45), Rgba([253, 231, 37, 255]));
        assert_eq!(img.get_pixel(90, TITLE_BAND + 135)[3], 0);
    }

    fn has_ink(img: &RgbaImage, x0: u32, y0: u32, x1: u32, y1: u32) -> bool {
        (y0..y1).any(|y| (x0..x1).any(|x| img.get_pixel(x, y)[3] > 0))
    }

    #[test]
    fn test_rasterize_draws_title_ticks_and_label() {
        let coords = Coordinates::from_axes(&[45.0, -45.0], &[-90.0, 90.0]);
        let values = array![[0.0, 1.0], [0.25, 0.5]];
        let layer = MapLayer::new(&values, &coords).unwrap();
        let figure = FigureSpec::new("SNOD snowda-ctl mean", "m", ScaleBounds::new(-0.5, 0.5))
            .with_map_width(360);

        let img = PngRenderer.rasterize(&[layer], &figure);
        let tick_x = 360 + COLORBAR_GAP + COLORBAR_BAR_WIDTH + TICK_LENGTH;
        assert!(has_ink(&img, 0, 0, img.width(), TITLE_BAND));
        assert!(has_ink(&img, tick_x, TITLE_BAND, img.width(), TITLE_BAND + 180));
        assert!(has_ink(&img, 0, TITLE_BAND + 180, img.width(), img.height()));

        // nothing but the map below an untitled, unlabeled figure's title band
        let bare = FigureSpec::new("", "", ScaleBounds::new(-0.5, 0.5)).with_map_width(360);
        let img = PngRenderer.rasterize(&[layer], &bare);
        assert!(!has_ink(&img, 0, 0, img.width(), TITLE_BAND));
        assert!(!has_ink(&img, 0, TITLE_BAND + 180, img.width(), img.height()));
    }

    #[test]
    fn test_long_title_stays_inside_image() {
        let coords = Coordinates::from_axes(&[45.0, -45.0], &[-90.0, 90.0]);
        let values = array![[0.0, 1.0], [0.25, 0.5]];
        let layer = MapLayer::new(&values, &coords).unwrap();
        let title = "T_850 snowda-ctl mean 2024-10-25 00:00:00-2025-03-24 00:00:00 ".repeat(4);
        let figure = FigureSpec::new(title, "K", ScaleBounds::new(0.0, 1.0)).with_map_width(120);

        let img = PngRenderer.rasterize(&[layer], &figure);
        assert!(has_ink(&img, 0, 0, img.width(), TITLE_BAND));
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(2.0), "2");
        assert_eq!(format_tick(0.25), "0.25");
        assert_eq!(format_tick(-1.5), "-1.5");
        assert_eq!(format_tick(0.0), "0");
        assert_eq!(format_tick(-0.0), "0");
        assert_eq!(format_tick(283.1234), "283.123");
        assert_eq!(format_tick(1e-5), "1.00e-5");
        assert_eq!(format_tick(101325.0), "1.01e5");
    }

    #[test]
    fn test_render_writes_png_and_sidecar() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("figs").join("T_850_diff.png");
        let coords = Coordinates::from_axes(&[50.0, 40.0, 30.0], &[240.0, 260.0, 280.0]);
        let values = array![[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [f64::NAN, 0.5, 0.25]];
        let layer = MapLayer::new(&values, &coords).unwrap();
        let figure = FigureSpec::new("T_850 snowda-ctl mean", "K", ScaleBounds::new(-2.0, 2.0))
            .with_colormap(Colormap::Coolwarm)
            .with_region(Region::Conus)
            .with_map_width(260);

        PngRenderer.render(&[layer], &figure, &output).unwrap();

        let img = image::open(&output).unwrap();
        assert_eq!(img.height(), TITLE_BAND + 108 + LABEL_BAND);
        let sidecar = sidecar_path(&output);
        assert!(sidecar.ends_with("T_850_diff.png.json"));
        let metadata: FigureMetadata =
            serde_json::from_str(&fs::read_to_string(sidecar).unwrap()).unwrap();
        assert_eq!(metadata.title, "T_850 snowda-ctl mean");
        assert_eq!(metadata.colormap, Colormap::Coolwarm);
        assert_eq!(metadata.region, Region::Conus);
        assert_eq!(metadata.bounds.as_tuple(), (-2.0, 2.0));
    }

    #[test]
    fn test_layer_shape_checked() {
        let coords = Coordinates::from_axes(&[1.0, 0.0], &[0.0, 1.0]);
        let values = Grid::zeros((3, 2));
        assert!(MapLayer::new(&values, &coords).is_err());
    }
}
