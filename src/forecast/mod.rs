//! Short-horizon forecasting of a groundwater series.
//!
//! Pipeline:
//! 1. build lag/calendar feature rows (`features`)
//! 2. cross-validate the candidate models and pick one (`evaluate`)
//! 3. roll the chosen model forward one period at a time, feeding each
//!    prediction back in as history

pub mod evaluate;
pub mod features;
pub mod model;

pub use evaluate::*;
pub use features::*;
pub use model::*;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{SamplingCadence, TimePoint};
use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    pub selected: ModelKind,
    pub evaluations: Vec<ModelEvaluation>,
    /// Models that could not be fitted, with the reason.
    pub skipped: Vec<(ModelKind, String)>,
    pub points: Vec<ForecastPoint>,
}

/// Recursive `horizon`-step forecast continuing `points`.
///
/// Dates advance from the last observed date by `cadence`.
pub fn forecast(
    model: &FittedModel,
    points: &[TimePoint],
    cadence: SamplingCadence,
    horizon: usize,
) -> Result<Vec<ForecastPoint>, EngineError> {
    let last = points.last().ok_or(EngineError::InsufficientData {
        what: "forecast",
        needed: MIN_HISTORY,
        got: 0,
    })?;
    if points.len() < MIN_HISTORY {
        return Err(EngineError::InsufficientData {
            what: "forecast",
            needed: MIN_HISTORY,
            got: points.len(),
        });
    }

    let mut history: Vec<f64> = points.iter().map(|p| p.value).collect();
    let mut out = Vec::with_capacity(horizon);
    for step in 1..=horizon {
        let date = u32::try_from(step)
            .ok()
            .and_then(|s| cadence.step(last.date, s))
            .ok_or_else(|| EngineError::InvalidParameter(format!("forecast step {step} overflows the calendar")))?;
        let index = history.len();
        let features = features_at(&history, index, date).ok_or(EngineError::InsufficientData {
            what: "forecast",
            needed: MIN_HISTORY,
            got: index,
        })?;
        let value = model.predict(&features);
        history.push(value);
        out.push(ForecastPoint { date, value });
    }
    Ok(out)
}

/// Select a model on `points` and forecast `horizon` periods ahead.
pub fn run_forecast(
    points: &[TimePoint],
    cadence: SamplingCadence,
    horizon: usize,
) -> Result<ForecastReport, EngineError> {
    let dates: Vec<NaiveDate> = points.iter().map(|p| p.date).collect();
    let values: Vec<f64> = points.iter().map(|p| p.value).collect();
    let rows = build_rows(&dates, &values);

    let selection = evaluate_and_select(&rows)?;
    let forecast_points = forecast(&selection.best, points, cadence, horizon)?;
    info!(
        model = selection.best.kind().display_name(),
        horizon,
        "forecast complete"
    );

    Ok(ForecastReport {
        selected: selection.best.kind(),
        evaluations: selection.evaluations,
        skipped: selection.skipped,
        points: forecast_points,
    })
}
