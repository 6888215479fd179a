//! # Field Selection
//!
//! Identifies a physical quantity inside a GRIB2 file by NCEP short name and
//! level description, using the same spellings as grib2io (`TMP` at
//! `850 mb`, `PRMSL` at `mean sea level`, ...).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AnalysisError, Result};

/// GRIB2 parameter identity: discipline, category and number (Code Table 4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParameterId {
    pub discipline: u8,
    pub category: u8,
    pub number: u8,
}

/// NCEP short names this tool knows how to locate, with default units.
const SHORT_NAMES: &[(&str, u8, u8, u8, &str)] = &[
    ("TMP", 0, 0, 0, "K"),
    ("SPFH", 0, 1, 0, "kg kg-1"),
    ("RH", 0, 1, 1, "%"),
    ("APCP", 0, 1, 8, "kg m-2"),
    ("SNOD", 0, 1, 11, "m"),
    ("WEASD", 0, 1, 13, "kg m-2"),
    ("UGRD", 0, 2, 2, "m s-1"),
    ("VGRD", 0, 2, 3, "m s-1"),
    ("PRES", 0, 3, 0, "Pa"),
    ("PRMSL", 0, 3, 1, "Pa"),
    ("HGT", 0, 3, 5, "gpm"),
];

impl ParameterId {
    pub fn from_short_name(short_name: &str) -> Result<Self> {
        SHORT_NAMES
            .iter()
            .find(|(name, ..)| name.eq_ignore_ascii_case(short_name.trim()))
            .map(|&(_, discipline, category, number, _)| ParameterId {
                discipline,
                category,
                number,
            })
            .ok_or_else(|| {
                AnalysisError::Config(format!(
                    "unknown short name '{}' (known: {})",
                    short_name,
                    known_short_names().join(", ")
                ))
            })
    }

    pub fn short_name(&self) -> Option<&'static str> {
        self.table_entry().map(|(name, ..)| *name)
    }

    pub fn units(&self) -> Option<&'static str> {
        self.table_entry().map(|(.., units)| *units)
    }

    fn table_entry(&self) -> Option<&'static (&'static str, u8, u8, u8, &'static str)> {
        SHORT_NAMES.iter().find(|(_, d, c, n, _)| {
            *d == self.discipline && *c == self.category && *n == self.number
        })
    }
}

pub fn known_short_names() -> Vec<&'static str> {
    SHORT_NAMES.iter().map(|(name, ..)| *name).collect()
}

/// A vertical level, i.e. a GRIB2 first fixed surface (Code Table 4.5).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LevelSpec {
    /// Isobaric surface, value in hPa (`"850 mb"`).
    Isobaric(f64),
    /// Ground or water surface (`"surface"`).
    Surface,
    /// Height above ground in metres (`"2 m above ground"`).
    AboveGround(f64),
    /// Mean sea level (`"mean sea level"`).
    MeanSeaLevel,
    /// Entire atmosphere as a single layer (`"entire atmosphere"`).
    EntireAtmosphere,
}

impl LevelSpec {
    pub fn parse(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        let normalized = normalized.split_whitespace().collect::<Vec<_>>().join(" ");
        match normalized.as_str() {
            "surface" | "sfc" => return Ok(LevelSpec::Surface),
            "mean sea level" | "msl" => return Ok(LevelSpec::MeanSeaLevel),
            "entire atmosphere" => return Ok(LevelSpec::EntireAtmosphere),
            _ => {}
        }

        if let Some(value) = normalized
            .strip_suffix(" mb")
            .or_else(|| normalized.strip_suffix(" hpa"))
        {
            let value = parse_level_value(value, s)?;
            return Ok(LevelSpec::Isobaric(value));
        }
        if let Some(value) = normalized.strip_suffix(" m above ground") {
            let value = parse_level_value(value, s)?;
            return Ok(LevelSpec::AboveGround(value));
        }

        Err(AnalysisError::Config(format!(
            "unsupported level '{}': expected '<n> mb', 'surface', '<n> m above ground', \
             'mean sea level' or 'entire atmosphere'",
            s
        )))
    }

    /// GRIB2 fixed surface type (Code Table 4.5).
    pub fn surface_type(&self) -> u8 {
        match self {
            LevelSpec::Surface => 1,
            LevelSpec::Isobaric(_) => 100,
            LevelSpec::MeanSeaLevel => 101,
            LevelSpec::AboveGround(_) => 103,
            LevelSpec::EntireAtmosphere => 200,
        }
    }

    /// Whether a decoded fixed surface (type and SI value) denotes this level.
    pub fn matches(&self, surface_type: u8, value: f64) -> bool {
        if surface_type != self.surface_type() {
            return false;
        }
        match self {
            // isobaric values are encoded in Pa
            LevelSpec::Isobaric(hpa) => (value - hpa * 100.0).abs() < 1e-3,
            LevelSpec::AboveGround(m) => (value - m).abs() < 1e-6,
            _ => true,
        }
    }
}

fn parse_level_value(value: &str, original: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| AnalysisError::Config(format!("invalid level value in '{}'", original)))
}

impl fmt::Display for LevelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelSpec::Isobaric(v) => write!(f, "{} mb", v),
            LevelSpec::Surface => write!(f, "surface"),
            LevelSpec::AboveGround(v) => write!(f, "{} m above ground", v),
            LevelSpec::MeanSeaLevel => write!(f, "mean sea level"),
            LevelSpec::EntireAtmosphere => write!(f, "entire atmosphere"),
        }
    }
}

/// Describes a decoded fixed surface the way grib2io prints levels.
pub fn describe_surface(surface_type: u8, value: f64) -> String {
    match surface_type {
        1 => "surface".to_string(),
        100 => format!("{} mb", value / 100.0),
        101 => "mean sea level".to_string(),
        103 => format!("{} m above ground", value),
        200 => "entire atmosphere".to_string(),
        other => format!("surface type {} ({})", other, value),
    }
}

/// One physical quantity tracked through a job.
///
/// `name` labels outputs (`T_850` → `T_850_mean.npy`, `T_850_diff.png`);
/// `short_name` and `level` locate it in each cycle's files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub short_name: String,
    pub level: String,
    /// Colorbar label; empty when unset.
    #[serde(default)]
    pub units: Option<String>,
}

impl FieldSpec {
    pub fn new(name: &str, short_name: &str, level: &str) -> Self {
        FieldSpec {
            name: name.to_string(),
            short_name: short_name.to_string(),
            level: level.to_string(),
            units: None,
        }
    }

    pub fn with_units(mut self, units: &str) -> Self {
        self.units = Some(units.to_string());
        self
    }

    pub fn selector(&self) -> Result<FieldSelector> {
        FieldSelector::new(&self.short_name, &self.level)
    }
}

/// Parsed form of a short name plus level.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSelector {
    pub short_name: String,
    pub parameter: ParameterId,
    pub level_label: String,
    pub level: LevelSpec,
}

impl FieldSelector {
    pub fn new(short_name: &str, level: &str) -> Result<Self> {
        Ok(FieldSelector {
            short_name: short_name.trim().to_ascii_uppercase(),
            parameter: ParameterId::from_short_name(short_name)?,
            level_label: level.trim().to_string(),
            level: LevelSpec::parse(level)?,
        })
    }
}

/// The four fields compared by the snow-DA experiment.
pub fn snow_da_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::new("T_850", "TMP", "850 mb").with_units("K"),
        FieldSpec::new("snod", "SNOD", "surface"),
        FieldSpec::new("T_2m", "TMP", "2 m above ground"),
        FieldSpec::new("mslp", "PRMSL", "mean sea level"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_name_lookup() {
        let tmp = ParameterId::from_short_name("TMP").unwrap();
        assert_eq!((tmp.discipline, tmp.category, tmp.number), (0, 0, 0));
        let prmsl = ParameterId::from_short_name("prmsl").unwrap();
        assert_eq!((prmsl.category, prmsl.number), (3, 1));
        assert_eq!(prmsl.short_name(), Some("PRMSL"));
        assert_eq!(prmsl.units(), Some("Pa"));
        assert!(ParameterId::from_short_name("dust_bin1").is_err());
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!(LevelSpec::parse("850 mb").unwrap(), LevelSpec::Isobaric(850.0));
        assert_eq!(LevelSpec::parse("1000 hPa").unwrap(), LevelSpec::Isobaric(1000.0));
        assert_eq!(LevelSpec::parse(" Surface ").unwrap(), LevelSpec::Surface);
        assert_eq!(
            LevelSpec::parse("2 m above ground").unwrap(),
            LevelSpec::AboveGround(2.0)
        );
        assert_eq!(LevelSpec::parse("mean  sea level").unwrap(), LevelSpec::MeanSeaLevel);
        assert!(LevelSpec::parse("tropopause").is_err());
        assert!(LevelSpec::parse("abc mb").is_err());
    }

    #[test]
    fn test_level_matching() {
        let level = LevelSpec::parse("850 mb").unwrap();
        assert!(level.matches(100, 85000.0));
        assert!(!level.matches(100, 50000.0));
        assert!(!level.matches(103, 85000.0));

        let level = LevelSpec::parse("2 m above ground").unwrap();
        assert!(level.matches(103, 2.0));
        assert!(!level.matches(103, 10.0));

        assert!(LevelSpec::MeanSeaLevel.matches(101, 0.0));
    }

    #[test]
    fn test_describe_surface_round_trips_through_parse() {
        for (surface_type, value) in [(100u8, 85000.0), (1, 0.0), (103, 2.0), (101, 0.0)] {
            let label = describe_surface(surface_type, value);
            let level = LevelSpec::parse(&label).unwrap();
            assert!(level.matches(surface_type, value), "{}", label);
        }
    }

    #[test]
    fn test_snow_da_fields_are_valid() {
        for field in snow_da_fields() {
            assert!(field.selector().is_ok(), "{}", field.name);
        }
    }
}
