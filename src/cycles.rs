//! # Forecast Cycles
//!
//! Enumerates cycle initialization times between two endpoints (both
//! inclusive) at a fixed step, and lays out the per-cycle product paths of a
//! GDAS-style archive.

use chrono::{DateTime, Duration, NaiveDateTime};
use std::path::PathBuf;

use crate::error::{AnalysisError, Result};

/// Default cycle spacing in hours.
pub const DEFAULT_STEP_HOURS: i64 = 6;

/// Default product path below an experiment root.
pub const GDAS_PGRB2_TEMPLATE: &str =
    "{root}/gdas.{ymd}/{hh}/products/atmos/grib2/0p25/gdas.t{hh}z.pgrb2.0p25.{fhr}";

/// Ordered, inclusive sequence of cycle times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub step: Duration,
}

impl CycleRange {
    /// Fails unless `step` is at least one second.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime, step: Duration) -> Result<Self> {
        if step < Duration::seconds(1) {
            return Err(AnalysisError::Config(format!(
                "cycle step must be at least one second, got {} ms",
                step.num_milliseconds()
            )));
        }
        Ok(CycleRange { start, end, step })
    }

    pub fn every_hours(start: NaiveDateTime, end: NaiveDateTime, hours: i64) -> Result<Self> {
        let step = Duration::try_hours(hours).ok_or_else(|| {
            AnalysisError::Config(format!("cycle step of {} hour(s) is out of range", hours))
        })?;
        Self::new(start, end, step)
    }

    pub fn iter(&self) -> CycleIter {
        CycleIter {
            next: Some(self.start),
            end: self.end,
            step: self.step,
        }
    }

    /// Number of cycles in the range; zero when `start` is after `end`.
    pub fn len(&self) -> usize {
        if self.start > self.end {
            return 0;
        }
        let span = (self.end - self.start).num_seconds();
        (span / self.step.num_seconds()) as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IntoIterator for &CycleRange {
    type Item = NaiveDateTime;
    type IntoIter = CycleIter;

    fn into_iter(self) -> CycleIter {
        self.iter()
    }
}

pub struct CycleIter {
    next: Option<NaiveDateTime>,
    end: NaiveDateTime,
    step: Duration,
}

impl Iterator for CycleIter {
    type Item = NaiveDateTime;

    fn next(&mut self) -> Option<NaiveDateTime> {
        let current = self.next.filter(|t| *t <= self.end)?;
        self.next = current.checked_add_signed(self.step);
        Some(current)
    }
}

/// Parses a cycle time.
///
/// Accepts `YYYY-MM-DDTHH`, `YYYY-MM-DDTHH:MM[:SS]` (with `T` or a space),
/// `YYYYMMDDHH` and RFC 3339 timestamps.
pub fn parse_cycle_time(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_utc());
    }
    let formats = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    for format in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt);
        }
    }
    // Hour-only forms are not accepted by chrono directly; pad the minutes.
    if s.len() == 13 && (s.as_bytes()[10] == b'T' || s.as_bytes()[10] == b' ') {
        let padded = format!("{}:00", s);
        if let Ok(dt) = NaiveDateTime::parse_from_str(&padded, "%Y-%m-%dT%H:%M")
            .or_else(|_| NaiveDateTime::parse_from_str(&padded, "%Y-%m-%d %H:%M"))
        {
            return Ok(dt);
        }
    }
    if s.len() == 10 && s.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&format!("{}00", s), "%Y%m%d%H%M") {
            return Ok(dt);
        }
    }
    Err(AnalysisError::Config(format!(
        "invalid cycle time '{}': expected YYYY-MM-DDTHH, YYYYMMDDHH or RFC 3339",
        s
    )))
}

/// Expands a product path template for one cycle.
///
/// Placeholders: `{root}`, `{ymd}` (YYYYMMDD), `{hh}` (cycle hour), `{fhr}`
/// (forecast hour label such as `f000`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CyclePathLayout {
    pub template: String,
    pub forecast_hour: String,
}

impl Default for CyclePathLayout {
    fn default() -> Self {
        CyclePathLayout {
            template: GDAS_PGRB2_TEMPLATE.to_string(),
            forecast_hour: "f000".to_string(),
        }
    }
}

impl CyclePathLayout {
    pub fn new(template: &str, forecast_hour: &str) -> Self {
        CyclePathLayout {
            template: template.to_string(),
            forecast_hour: forecast_hour.to_string(),
        }
    }

    pub fn path_for(&self, root: &str, cycle: NaiveDateTime) -> PathBuf {
        let root = root.trim_end_matches('/');
        PathBuf::from(
            self.template
                .replace("{root}", root)
                .replace("{ymd}", &cycle.format("%Y%m%d").to_string())
                .replace("{hh}", &cycle.format("%H").to_string())
                .replace("{fhr}", &self.forecast_hour),
        )
    }
}
