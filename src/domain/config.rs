//! Resolved run configuration.
//!
//! The CLI builds a `PipelineConfig` from flags/environment; library callers can
//! construct one directly. Nothing here has a built-in default for the two
//! empirically chosen constants (conversion factor, baseline year): they must be
//! supplied and are echoed into every report.

use std::path::PathBuf;

use serde::Serialize;

use crate::domain::{ColumnMapping, OverlapPolicy, SamplingCadence};
use crate::error::EngineError;

/// One input file and how to read it.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesInput {
    pub path: PathBuf,
    pub columns: ColumnMapping,
    /// Display label for values of this series (e.g. "cm", "kg/m2").
    pub unit: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineConfig {
    pub historical: SeriesInput,
    pub recent: SeriesInput,
    pub cadence: SamplingCadence,
    /// Calendar year of the recent series used as its reference level.
    pub baseline_year: i32,
    /// Recent units per one historical unit.
    pub unit_conversion_factor: f64,
    /// Fixed continuity anchor; `None` means "last historical value".
    pub offset: Option<f64>,
    pub overlap_policy: OverlapPolicy,
    /// Half-width (per year, series units) of the "stable" band used when
    /// interpreting significant trends.
    pub stable_band: f64,
    /// Number of future periods to forecast from the combined series (0 = skip).
    pub forecast_horizon: usize,
    #[serde(skip)]
    pub plot: bool,
    #[serde(skip)]
    pub plot_width: usize,
    #[serde(skip)]
    pub plot_height: usize,
    #[serde(skip)]
    pub export_json: Option<PathBuf>,
    #[serde(skip)]
    pub export_csv: Option<PathBuf>,
}

impl PipelineConfig {
    /// Check the externally supplied constants before any file is read.
    ///
    /// This only rejects values the arithmetic cannot use; physical plausibility
    /// of the factor or the baseline year is not verified.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.unit_conversion_factor.is_finite() || self.unit_conversion_factor == 0.0 {
            return Err(EngineError::InvalidParameter(format!(
                "unit conversion factor must be finite and non-zero (got {})",
                self.unit_conversion_factor
            )));
        }
        if let Some(offset) = self.offset {
            if !offset.is_finite() {
                return Err(EngineError::InvalidParameter(format!(
                    "offset must be finite (got {offset})"
                )));
            }
        }
        if !self.stable_band.is_finite() || self.stable_band < 0.0 {
            return Err(EngineError::InvalidParameter(format!(
                "stable band must be finite and >= 0 (got {})",
                self.stable_band
            )));
        }
        for input in [&self.historical, &self.recent] {
            if input.columns.date_column.trim().is_empty() || input.columns.value_column.trim().is_empty() {
                return Err(EngineError::InvalidParameter(format!(
                    "column names for '{}' must not be empty",
                    input.path.display()
                )));
            }
        }
        Ok(())
    }
}
