//! Read/write the JSON run report.
//!
//! The run report is the portable record of one pipeline run:
//! - per-series load stats, summary, trend and its reading
//! - the baseline and splice parameters actually used (including defaults)
//! - caveats raised by the splice
//! - the combined series with provenance
//! - the optional forecast
//!
//! It carries no timestamps, so identical inputs give identical bytes.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::{MonthStats, SeriesSummary, TrendInterpretation, YearValue};
use crate::domain::{Baseline, SamplingCadence, SpliceCaveat, SpliceParams, TimePoint, TrendResult};
use crate::error::AppError;
use crate::forecast::ForecastReport;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesReport {
    pub unit: String,
    pub rows_read: usize,
    pub rows_dropped: usize,
    pub duplicate_dates: usize,
    pub summary: SeriesSummary,
    pub trend: TrendResult,
    pub interpretation: TrendInterpretation,
    /// Change between consecutive annual means.
    #[serde(default)]
    pub year_over_year: Vec<YearValue>,
    /// Per-calendar-month climatology.
    #[serde(default)]
    pub seasonal: Vec<MonthStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub tool: String,
    pub cadence: SamplingCadence,
    pub historical: SeriesReport,
    pub recent: SeriesReport,
    pub baseline: Baseline,
    pub splice: SpliceParams,
    #[serde(default)]
    pub caveats: Vec<SpliceCaveat>,
    /// Trend of the spliced recent portion, in historical units.
    pub recent_trend_converted: TrendResult,
    /// Annual means of the combined series.
    pub annual_means: Vec<YearValue>,
    pub combined: Vec<TimePoint>,
    #[serde(default)]
    pub forecast: Option<ForecastReport>,
}

/// Write a run report JSON file.
pub fn write_report_json(path: &Path, report: &RunReport) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create report JSON '{}': {e}", path.display())))?;
    write_report(file, report)
}

pub(crate) fn write_report<W: Write>(mut out: W, report: &RunReport) -> Result<(), AppError> {
    serde_json::to_writer_pretty(&mut out, report)
        .map_err(|e| AppError::new(2, format!("Failed to write report JSON: {e}")))?;
    out.write_all(b"\n")
        .map_err(|e| AppError::new(2, format!("Failed to write report JSON: {e}")))?;
    Ok(())
}

/// Read a run report JSON file.
pub fn read_report_json(path: &Path) -> Result<RunReport, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open report JSON '{}': {e}", path.display())))?;
    let report: RunReport =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid report JSON: {e}")))?;
    Ok(report)
}
