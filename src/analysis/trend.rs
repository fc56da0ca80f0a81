//! Trend estimation against the sample index.
//!
//! The regressor is the zero-based position of each point (`0, 1, 2, ...`), not
//! calendar time, so the raw slope is "change per sample interval". Irregular
//! spacing or gaps are therefore ignored; the cadence only scales the slope to a
//! per-year figure.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{SamplingCadence, Series, TrendResult};
use crate::error::EngineError;
use crate::math::linregress;

/// p-value below which a trend is reported as significant.
///
/// Fixed on purpose; callers wanting another threshold compare `p_value` directly.
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Fit an OLS line through `series` and annualize its slope.
pub fn estimate_trend(series: &Series, cadence: SamplingCadence) -> Result<TrendResult, EngineError> {
    let values: Vec<f64> = series.values().collect();
    trend_from_values(&values, cadence)
}

pub(crate) fn trend_from_values(values: &[f64], cadence: SamplingCadence) -> Result<TrendResult, EngineError> {
    if values.len() < 2 {
        return Err(EngineError::InsufficientData {
            what: "trend regression",
            needed: 2,
            got: values.len(),
        });
    }

    let x: Vec<f64> = (0..values.len()).map(|i| i as f64).collect();
    let fit = linregress(&x, values).ok_or_else(|| {
        EngineError::InvalidSeries("regression against the sample index is undefined".to_string())
    })?;

    let r_squared = (fit.r_value * fit.r_value).clamp(0.0, 1.0);
    let slope_annualized = fit.slope * cadence.periods_per_year();
    if ![fit.slope, slope_annualized, fit.intercept, fit.std_err].iter().all(|v| v.is_finite()) {
        return Err(EngineError::InvalidSeries(
            "trend coefficients overflow the representable range".to_string(),
        ));
    }
    let result = TrendResult {
        n_points: values.len(),
        slope_per_period: fit.slope,
        slope_annualized,
        intercept: fit.intercept,
        r_squared,
        p_value: fit.p_value,
        std_err: fit.std_err,
        significant: fit.p_value < SIGNIFICANCE_LEVEL,
    };
    debug!(
        n = result.n_points,
        slope = result.slope_per_period,
        r_squared = result.r_squared,
        p_value = result.p_value,
        "trend fitted"
    );
    Ok(result)
}

/// Qualitative reading of a trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendInterpretation {
    Declining,
    Increasing,
    Stable,
    NotSignificant,
}

impl TrendInterpretation {
    pub fn describe(self) -> &'static str {
        match self {
            TrendInterpretation::Declining => "significant declining trend",
            TrendInterpretation::Increasing => "significant increasing trend",
            TrendInterpretation::Stable => "significant but small change, relatively stable",
            TrendInterpretation::NotSignificant => "no statistically significant trend",
        }
    }
}

/// Classify a trend; `stable_band` is the per-year magnitude below which a
/// significant slope still counts as stable.
pub fn interpret(trend: &TrendResult, stable_band: f64) -> TrendInterpretation {
    if !trend.significant {
        return TrendInterpretation::NotSignificant;
    }
    if trend.slope_annualized < -stable_band {
        TrendInterpretation::Declining
    } else if trend.slope_annualized > stable_band {
        TrendInterpretation::Increasing
    } else {
        TrendInterpretation::Stable
    }
}
