//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory by the engine stages
//! - exported to JSON/CSV
//! - reloaded later for plotting

use std::fmt;

use chrono::{Datelike, Months, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Which upstream source a point came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Satellite gravimetry record (GRACE), already an anomaly in the target unit.
    Historical,
    /// Land-surface model record (GLDAS), a soil-moisture proxy in its own unit.
    Recent,
}

impl Source {
    pub fn as_str(self) -> &'static str {
        match self {
            Source::Historical => "historical",
            Source::Recent => "recent",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a value was observed directly or derived by the splice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointKind {
    Measured,
    Estimated,
}

impl PointKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PointKind::Measured => "measured",
            PointKind::Estimated => "estimated",
        }
    }
}

impl fmt::Display for PointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One dated value with provenance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    pub date: NaiveDate,
    pub value: f64,
    pub source: Source,
    pub kind: PointKind,
}

impl TimePoint {
    pub fn new(date: NaiveDate, value: f64, source: Source, kind: PointKind) -> Self {
        Self {
            date,
            value,
            source,
            kind,
        }
    }
}

/// A validated, chronologically ordered series from a single source.
///
/// Invariants (checked by [`Series::new`]):
/// - every point carries the series' `source`
/// - values are finite
/// - dates are non-decreasing
///
/// Duplicate dates are allowed; they are a data-quality issue reported via
/// [`Series::duplicate_dates`], not silently merged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    source: Source,
    points: Vec<TimePoint>,
}

impl Series {
    pub fn new(source: Source, points: Vec<TimePoint>) -> Result<Self, EngineError> {
        for (idx, p) in points.iter().enumerate() {
            if p.source != source {
                return Err(EngineError::InvalidSeries(format!(
                    "point {idx} is tagged {} in a {source} series",
                    p.source
                )));
            }
            if !p.value.is_finite() {
                return Err(EngineError::InvalidSeries(format!(
                    "point {idx} ({}) has a non-finite value",
                    p.date
                )));
            }
        }
        if let Some(w) = points.windows(2).find(|w| w[1].date < w[0].date) {
            return Err(EngineError::InvalidSeries(format!(
                "dates are not sorted ({} follows {})",
                w[1].date, w[0].date
            )));
        }
        Ok(Self { source, points })
    }

    /// Build a series of measured points from `(date, value)` pairs.
    pub fn from_pairs(source: Source, pairs: &[(NaiveDate, f64)]) -> Result<Self, EngineError> {
        let points = pairs
            .iter()
            .map(|&(date, value)| TimePoint::new(date, value, source, PointKind::Measured))
            .collect();
        Self::new(source, points)
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn points(&self) -> &[TimePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.value)
    }

    pub fn first(&self) -> Option<&TimePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&TimePoint> {
        self.points.last()
    }

    /// Number of points whose date equals the preceding point's date.
    pub fn duplicate_dates(&self) -> usize {
        self.points.windows(2).filter(|w| w[0].date == w[1].date).count()
    }

    /// Points dated within calendar `year`.
    pub fn in_year(&self, year: i32) -> impl Iterator<Item = &TimePoint> + '_ {
        self.points.iter().filter(move |p| p.date.year() == year)
    }
}

/// Result of an ordinary least-squares trend fit against the sample index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub n_points: usize,
    /// Change per sample interval.
    pub slope_per_period: f64,
    /// `slope_per_period` scaled by the sampling cadence.
    pub slope_annualized: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub p_value: f64,
    /// Standard error of the per-period slope.
    pub std_err: f64,
    pub significant: bool,
}

/// Reference level of a series over one calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub reference_value: f64,
    pub reference_window: i32,
    pub n_points: usize,
}

/// Historical and spliced recent points in one date-sorted sequence.
///
/// Only built by the splice, so dates are sorted and every point carries
/// consistent provenance. Reports store the bare points instead.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedSeries {
    points: Vec<TimePoint>,
}

impl CombinedSeries {
    pub(crate) fn from_sorted(points: Vec<TimePoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[TimePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn portion(&self, source: Source) -> impl Iterator<Item = &TimePoint> + '_ {
        self.points.iter().filter(move |p| p.source == source)
    }
}

/// How often a series is sampled.
///
/// The trend estimator regresses against the sample index, so this is what turns
/// "change per sample" into "change per year".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SamplingCadence {
    Daily,
    Monthly,
    Quarterly,
    Annual,
}

impl SamplingCadence {
    pub fn as_str(self) -> &'static str {
        match self {
            SamplingCadence::Daily => "daily",
            SamplingCadence::Monthly => "monthly",
            SamplingCadence::Quarterly => "quarterly",
            SamplingCadence::Annual => "annual",
        }
    }

    pub fn periods_per_year(self) -> f64 {
        match self {
            SamplingCadence::Daily => 365.25,
            SamplingCadence::Monthly => 12.0,
            SamplingCadence::Quarterly => 4.0,
            SamplingCadence::Annual => 1.0,
        }
    }

    /// Advance `date` by `steps` sample intervals.
    pub fn step(self, date: NaiveDate, steps: u32) -> Option<NaiveDate> {
        match self {
            SamplingCadence::Daily => date.checked_add_days(chrono::Days::new(u64::from(steps))),
            SamplingCadence::Monthly => date.checked_add_months(Months::new(steps)),
            SamplingCadence::Quarterly => date.checked_add_months(Months::new(steps.checked_mul(3)?)),
            SamplingCadence::Annual => date.checked_add_months(Months::new(steps.checked_mul(12)?)),
        }
    }
}

/// Which CSV columns hold the date and the value.
///
/// Always supplied by the caller: the loader never guesses which column is the
/// groundwater proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub date_column: String,
    pub value_column: String,
}

impl ColumnMapping {
    pub fn new(date_column: impl Into<String>, value_column: impl Into<String>) -> Self {
        Self {
            date_column: date_column.into(),
            value_column: value_column.into(),
        }
    }
}

/// What to do when the recent series starts on or before the last historical date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OverlapPolicy {
    /// Splice anyway and attach a caveat to the output.
    Warn,
    /// Abort the run.
    Reject,
}

/// Unit conversion and continuity anchor for the splice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpliceParams {
    /// Recent units per one historical unit (e.g. 10 kg/m² per cm of water).
    pub unit_conversion_factor: f64,
    /// Value the zero-anomaly level maps to, normally the last historical value.
    pub offset: f64,
}

/// Soft warnings attached to a splice that still produced a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpliceCaveat {
    /// The splice assumes every historical point precedes every recent point.
    ConversionAssumptionViolation {
        last_historical: NaiveDate,
        first_recent: NaiveDate,
        overlapping_recent_points: usize,
    },
}

impl fmt::Display for SpliceCaveat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpliceCaveat::ConversionAssumptionViolation {
                last_historical,
                first_recent,
                overlapping_recent_points,
            } => write!(
                f,
                "date ranges overlap: recent starts {first_recent}, historical ends {last_historical} \
                 ({overlapping_recent_points} recent points inside the historical window)"
            ),
        }
    }
}
