//! # Grid Sources
//!
//! Reads 2-D fields and their latitude/longitude mesh out of gridded files.
//!
//! ## Key Components
//!
//! - [`GridSource`]: selects a field by short name and level and reads it
//! - [`SourceOpener`]: opens a [`GridSource`] for a path; the cycle loop is
//!   written against this trait so it can run on any backend
//! - [`GribSource`]: GRIB2 files decoded with the `grib` crate
//! - [`NetcdfSource`]: NetCDF variables (FV3 tile files and similar)

use chrono::{Duration, NaiveDateTime};
use log::debug;
use ndarray::{Array2, ArrayD, Axis, Ix2};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::error::{AnalysisError, Result};
use crate::fields::FieldSelector;
use crate::grid::{Coordinates, Grid};

/// One decoded field plus the metadata used in figure titles and labels.
#[derive(Debug, Clone)]
pub struct FieldData {
    pub values: Grid,
    pub units: Option<String>,
    pub reference_time: Option<String>,
    /// Forecast lead, e.g. `"6 Hour"`.
    pub lead_time: Option<String>,
    pub valid_time: Option<String>,
}

pub trait GridSource {
    fn path(&self) -> &Path;

    /// Reads the first field matching `selector`.
    fn read_field(&self, selector: &FieldSelector) -> Result<FieldData>;

    /// Reads the latitude/longitude mesh of the field matching `selector`.
    fn read_coordinates(&self, selector: &FieldSelector) -> Result<Coordinates>;
}

pub trait SourceOpener {
    /// Opens `path`, failing with [`AnalysisError::SourceNotFound`] when it does not exist.
    fn open(&self, path: &Path) -> Result<Box<dyn GridSource>>;
}

/// Opens GRIB2 files.
#[derive(Debug, Clone, Copy, Default)]
pub struct GribOpener;

impl SourceOpener for GribOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn GridSource>> {
        Ok(Box::new(GribSource::open(path)?))
    }
}

pub struct GribSource {
    path: PathBuf,
    grib: grib::Grib2<grib::SeekableGrib2Reader<BufReader<File>>>,
}

/// Summary of one GRIB2 submessage, as listed by `info`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SubmessageSummary {
    pub index: String,
    pub short_name: Option<String>,
    pub discipline: u8,
    pub category: Option<u8>,
    pub number: Option<u8>,
    pub level: Option<String>,
    pub lead_time: Option<String>,
    pub shape: Option<(usize, usize)>,
}

impl GribSource {
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AnalysisError::SourceNotFound(path.to_path_buf()));
        }
        debug!("Opening GRIB2 file: {}", path.display());
        let f = BufReader::new(File::open(path)?);
        let grib = grib::from_reader(f)?;
        Ok(GribSource {
            path: path.to_path_buf(),
            grib,
        })
    }

    pub fn len(&self) -> usize {
        self.grib.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn submessages(&self) -> Vec<SubmessageSummary> {
        self.grib
            .iter()
            .map(|((message, submessage), sub)| {
                let prod_def = sub.prod_def();
                let category = prod_def.parameter_category();
                let number = prod_def.parameter_number();
                let discipline = sub.indicator().discipline;
                let short_name = category.zip(number).and_then(|(c, n)| {
                    crate::fields::ParameterId {
                        discipline,
                        category: c,
                        number: n,
                    }
                    .short_name()
                    .map(str::to_string)
                });
                SubmessageSummary {
                    index: format!("{}.{}", message, submessage),
                    short_name,
                    discipline,
                    category,
                    number,
                    level: prod_def.fixed_surfaces().map(|(first, _)| {
                        crate::fields::describe_surface(first.surface_type, first.value())
                    }),
                    lead_time: prod_def.forecast_time().map(|ft| {
                        let (unit, value) = ft.describe();
                        format!("{} {}", value, unit)
                    }),
                    shape: sub.grid_shape().ok(),
                }
            })
            .collect()
    }

    fn matches<R>(sub: &grib::SubMessage<'_, R>, selector: &FieldSelector) -> bool {
        let Some(param) = sub.parameter() else {
            return false;
        };
        if param.discipline != selector.parameter.discipline
            || param.category != selector.parameter.category
            || param.num != selector.parameter.number
        {
            return false;
        }
        sub.prod_def()
            .fixed_surfaces()
            .map(|(first, _)| selector.level.matches(first.surface_type, first.value()))
            .unwrap_or(false)
    }

    fn not_found(&self, selector: &FieldSelector) -> AnalysisError {
        AnalysisError::FieldNotFound {
            field: selector.short_name.clone(),
            level: selector.level_label.clone(),
            path: self.path.clone(),
        }
    }
}

impl GridSource for GribSource {
    fn path(&self) -> &Path {
        &self.path
    }

    fn read_field(&self, selector: &FieldSelector) -> Result<FieldData> {
        let (index, sub) = self
            .grib
            .iter()
            .find(|(_, sub)| Self::matches(sub, selector))
            .ok_or_else(|| self.not_found(selector))?;

        let (ni, nj) = sub.grid_shape()?;
        let forecast = sub.prod_def().forecast_time();
        let lead_time = forecast.as_ref().map(|ft| {
            let (unit, value) = ft.describe();
            format!("{} {}", value, unit)
        });
        let reference = reference_time(&sub);
        let valid = reference
            .zip(forecast.as_ref())
            .and_then(|(reference, ft)| valid_time(reference, &ft.describe().0, ft.value));
        debug!(
            "Decoding {} at {} from submessage {}.{} of {}",
            selector.short_name,
            selector.level_label,
            index.0,
            index.1,
            self.path.display()
        );

        let decoder = grib::Grib2SubmessageDecoder::from(sub)?;
        let values: Vec<f64> = decoder.dispatch()?.map(f64::from).collect();
        let values = Array2::from_shape_vec((nj, ni), values).map_err(|e| {
            AnalysisError::Grib(format!(
                "decoded values do not fill a {}x{} grid: {}",
                nj, ni, e
            ))
        })?;

        Ok(FieldData {
            values,
            units: selector.parameter.units().map(str::to_string),
            reference_time: reference.map(|t| t.format(crate::TITLE_TIME_FORMAT).to_string()),
            lead_time,
            valid_time: valid.map(|t| t.format(crate::TITLE_TIME_FORMAT).to_string()),
        })
    }

    fn read_coordinates(&self, selector: &FieldSelector) -> Result<Coordinates> {
        let (_, sub) = self
            .grib
            .iter()
            .find(|(_, sub)| Self::matches(sub, selector))
            .ok_or_else(|| self.not_found(selector))?;

        let (ni, nj) = sub.grid_shape()?;
        let (lats, lons): (Vec<f64>, Vec<f64>) = sub
            .latlons()?
            .map(|(lat, lon)| (f64::from(lat), f64::from(lon)))
            .unzip();
        let to_grid = |v: Vec<f64>| {
            Array2::from_shape_vec((nj, ni), v)
                .map_err(|e| AnalysisError::Grib(format!("grid point count mismatch: {}", e)))
        };
        Coordinates::new(to_grid(lats)?, to_grid(lons)?)
    }
}

/// Reference time from the identification section, if the submessage carries one.
fn reference_time<R>(sub: &grib::SubMessage<'_, R>) -> Option<NaiveDateTime> {
    match sub.1.body.body.as_ref()? {
        grib::SectionBody::Section1(ident) => ident.ref_time().ok().map(|t| t.naive_utc()),
        _ => None,
    }
}

/// Length of a forecast lead given as a code table 4.4 unit name and a count.
///
/// Months, years and longer units have no fixed length and give `None`.
pub fn lead_duration(unit: &str, value: u32) -> Option<Duration> {
    let value = i64::from(value);
    match unit {
        "Second" => Duration::try_seconds(value),
        "Minute" => Duration::try_minutes(value),
        "Hour" => Duration::try_hours(value),
        "ThreeHours" => Duration::try_hours(value * 3),
        "SixHours" => Duration::try_hours(value * 6),
        "TwelveHours" => Duration::try_hours(value * 12),
        "Day" => Duration::try_days(value),
        _ => None,
    }
}

/// Reference time plus lead.
pub fn valid_time(reference: NaiveDateTime, unit: &str, value: u32) -> Option<NaiveDateTime> {
    reference.checked_add_signed(lead_duration(unit, value)?)
}

/// Reads variables from a NetCDF file.
pub struct NetcdfSource {
    path: PathBuf,
    file: netcdf::File,
}

impl NetcdfSource {
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AnalysisError::SourceNotFound(path.to_path_buf()));
        }
        debug!("Opening NetCDF file: {}", path.display());
        let file = netcdf::open(path)?;
        Ok(NetcdfSource {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file(&self) -> &netcdf::File {
        &self.file
    }

    /// Reads a variable as a 2-D grid, taking index 0 along every leading
    /// dimension beyond the last two (e.g. `snodl[0, :, :]`).
    ///
    /// `_FillValue` samples become NaN.
    pub fn read_variable(&self, name: &str) -> Result<FieldData> {
        let var = self
            .file
            .variable(name)
            .ok_or_else(|| AnalysisError::FieldNotFound {
                field: name.to_string(),
                level: "-".to_string(),
                path: self.path.clone(),
            })?;

        let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
        if shape.len() < 2 {
            return Err(AnalysisError::Config(format!(
                "variable '{}' has {} dimension(s); at least 2 are needed",
                name,
                shape.len()
            )));
        }

        let raw: Vec<f64> = var.get_values::<f64, _>(..)?;
        let fill_value = f64_attribute(&var, "_FillValue");
        let mut array = ArrayD::from_shape_vec(shape, raw).map_err(|e| {
            AnalysisError::Config(format!("variable '{}' has an inconsistent shape: {}", name, e))
        })?;
        while array.ndim() > 2 {
            array = array.index_axis_move(Axis(0), 0);
        }
        let mut values = array.into_dimensionality::<Ix2>().map_err(|e| {
            AnalysisError::Config(format!("variable '{}' is not 2-D: {}", name, e))
        })?;
        if let Some(fill) = fill_value {
            values.mapv_inplace(|v| if v == fill { f64::NAN } else { v });
        }

        Ok(FieldData {
            values,
            units: string_attribute(&var, "units"),
            reference_time: None,
            lead_time: None,
            valid_time: None,
        })
    }

    /// Reads a pair of 2-D coordinate variables such as `geolat`/`geolon`.
    pub fn read_mesh(&self, lat_name: &str, lon_name: &str) -> Result<Coordinates> {
        let lats = self.read_variable(lat_name)?.values;
        let lons = self.read_variable(lon_name)?.values;
        Coordinates::new(lats, lons)
    }
}

fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

fn f64_attribute(var: &netcdf::Variable, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    let value = var.attribute_value(name)?.ok()?;
    f64::try_from(value).ok()
}

fn string_attribute(var: &netcdf::Variable, name: &str) -> Option<String> {
    if !has_attr(var, name) {
        return None;
    }
    match var.attribute_value(name)?.ok()? {
        netcdf::AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_grib_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gdas.t00z.pgrb2.0p25.f000");
        let err = GribOpener.open(&path).err().unwrap();
        assert!(matches!(err, AnalysisError::SourceNotFound(p) if p == path));
    }

    #[test]
    fn test_lead_duration_units() {
        assert_eq!(lead_duration("Hour", 6), Some(Duration::hours(6)));
        assert_eq!(lead_duration("Minute", 90), Some(Duration::minutes(90)));
        assert_eq!(lead_duration("SixHours", 2), Some(Duration::hours(12)));
        assert_eq!(lead_duration("Day", 1), Some(Duration::hours(24)));
        assert_eq!(lead_duration("Second", 0), Some(Duration::zero()));
        assert_eq!(lead_duration("Month", 1), None);
        assert_eq!(lead_duration("code 200", 1), None);
    }

    #[test]
    fn test_valid_time_adds_lead_to_reference() {
        let reference = chrono::NaiveDate::from_ymd_opt(2024, 12, 31)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap();
        let valid = valid_time(reference, "Hour", 12).unwrap();
        assert_eq!(
            valid.format(crate::TITLE_TIME_FORMAT).to_string(),
            "2025-01-01 06:00:00"
        );
        assert_eq!(valid_time(reference, "TwelveHours", 1), Some(valid));
        assert_eq!(valid_time(reference, "Year", 1), None);
    }

    #[test]
    fn test_netcdf_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sfcanl_data.tile1.nc");
        assert!(matches!(
            NetcdfSource::open(&path),
            Err(AnalysisError::SourceNotFound(_))
        ));
    }

    #[test]
    fn test_netcdf_reads_first_time_slice_with_fill_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tile1.nc");
        {
            let mut file = netcdf::create(&path).unwrap();
            file.add_dimension("Time", 2).unwrap();
            file.add_dimension("yaxis_1", 2).unwrap();
            file.add_dimension("xaxis_1", 3).unwrap();
            let mut var = file
                .add_variable::<f64>("snodl", &["Time", "yaxis_1", "xaxis_1"])
                .unwrap();
            var.put_attribute("_FillValue", -999.0f64).unwrap();
            var.put_attribute("units", "mm").unwrap();
            let data: Vec<f64> = vec![
                1.0, 2.0, -999.0, 4.0, 5.0, 6.0, // Time 0
                10.0, 20.0, 30.0, 40.0, 50.0, 60.0, // Time 1
            ];
            var.put_values(&data, ..).unwrap();
        }

        let source = NetcdfSource::open(&path).unwrap();
        let field = source.read_variable("snodl").unwrap();
        assert_eq!(field.values.dim(), (2, 3));
        assert_eq!(field.values[[0, 0]], 1.0);
        assert!(field.values[[0, 2]].is_nan());
        assert_eq!(field.values[[1, 2]], 6.0);
        assert_eq!(field.units.as_deref(), Some("mm"));

        assert!(matches!(
            source.read_variable("geolon"),
            Err(AnalysisError::FieldNotFound { .. })
        ));
    }
}
