//! Forecasting models.
//!
//! Three deliberately simple models, in increasing order of complexity:
//!
//! - `Persistence`: next value equals the previous one (`lag_1`)
//! - `LinearTrend`: OLS line against the sample index
//! - `LagRegression`: least squares over all standardized features
//!
//! Models are fitted on `FeatureRow`s and predict from a feature vector, so the
//! same code path serves cross-validation and recursive forecasting.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EngineError;
use crate::forecast::features::{FeatureRow, Features, LAG1_FEATURE, N_FEATURES, TREND_FEATURE};
use crate::math::stats::{mean, population_std};
use crate::math::{linregress, solve_least_squares};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Persistence,
    LinearTrend,
    LagRegression,
}

impl ModelKind {
    /// Simplest first; selection ties resolve toward the front.
    pub const ALL: [ModelKind; 3] = [ModelKind::Persistence, ModelKind::LinearTrend, ModelKind::LagRegression];

    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::Persistence => "Persistence",
            ModelKind::LinearTrend => "Linear trend",
            ModelKind::LagRegression => "Lag regression",
        }
    }
}

/// Per-feature standardization fitted on training rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Standardizer {
    means: Features,
    scales: Features,
}

impl Standardizer {
    pub fn fit(rows: &[FeatureRow]) -> Option<Self> {
        let mut means = [0.0; N_FEATURES];
        let mut scales = [1.0; N_FEATURES];
        for j in 0..N_FEATURES {
            let column: Vec<f64> = rows.iter().map(|r| r.features[j]).collect();
            means[j] = mean(&column)?;
            let std = population_std(&column)?;
            // Constant columns are centered only.
            if std > 0.0 && std.is_finite() {
                scales[j] = std;
            }
        }
        Some(Self { means, scales })
    }

    pub fn transform(&self, features: &Features) -> Features {
        let mut out = [0.0; N_FEATURES];
        for j in 0..N_FEATURES {
            out[j] = (features[j] - self.means[j]) / self.scales[j];
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FittedModel {
    Persistence,
    LinearTrend { intercept: f64, slope: f64 },
    LagRegression { scaler: Standardizer, betas: Vec<f64> },
}

impl FittedModel {
    pub fn kind(&self) -> ModelKind {
        match self {
            FittedModel::Persistence => ModelKind::Persistence,
            FittedModel::LinearTrend { .. } => ModelKind::LinearTrend,
            FittedModel::LagRegression { .. } => ModelKind::LagRegression,
        }
    }

    pub fn predict(&self, features: &Features) -> f64 {
        match self {
            FittedModel::Persistence => features[LAG1_FEATURE],
            FittedModel::LinearTrend { intercept, slope } => intercept + slope * features[TREND_FEATURE],
            FittedModel::LagRegression { scaler, betas } => {
                let z = scaler.transform(features);
                betas[0] + betas[1..].iter().zip(z.iter()).map(|(b, x)| b * x).sum::<f64>()
            }
        }
    }
}

/// Fit `kind` on `rows`.
pub fn fit_model(kind: ModelKind, rows: &[FeatureRow]) -> Result<FittedModel, EngineError> {
    if rows.is_empty() {
        return Err(EngineError::InsufficientData {
            what: "forecast model training",
            needed: 1,
            got: 0,
        });
    }

    let model = match kind {
        ModelKind::Persistence => FittedModel::Persistence,
        ModelKind::LinearTrend => {
            let x: Vec<f64> = rows.iter().map(|r| r.features[TREND_FEATURE]).collect();
            let y: Vec<f64> = rows.iter().map(|r| r.target).collect();
            let fit = linregress(&x, &y).ok_or(EngineError::InsufficientData {
                what: "linear trend model",
                needed: 2,
                got: rows.len(),
            })?;
            FittedModel::LinearTrend {
                intercept: fit.intercept,
                slope: fit.slope,
            }
        }
        ModelKind::LagRegression => {
            let scaler = Standardizer::fit(rows).ok_or(EngineError::InsufficientData {
                what: "lag regression model",
                needed: 1,
                got: rows.len(),
            })?;
            let mut x = DMatrix::zeros(rows.len(), N_FEATURES + 1);
            for (i, row) in rows.iter().enumerate() {
                x[(i, 0)] = 1.0;
                for (j, v) in scaler.transform(&row.features).iter().enumerate() {
                    x[(i, j + 1)] = *v;
                }
            }
            let y = DVector::from_iterator(rows.len(), rows.iter().map(|r| r.target));
            let beta = solve_least_squares(&x, &y)
                .ok_or_else(|| EngineError::Solver(format!("lag regression on {} rows", rows.len())))?;
            FittedModel::LagRegression {
                scaler,
                betas: beta.iter().copied().collect(),
            }
        }
    };

    debug!(model = kind.display_name(), rows = rows.len(), "fitted forecast model");
    Ok(model)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::forecast::features::build_rows;

    fn rows_for(values: &[f64]) -> Vec<FeatureRow> {
        let start = NaiveDate::from_ymd_opt(2002, 4, 1).unwrap();
        let dates: Vec<NaiveDate> = (0..values.len())
            .map(|i| start.checked_add_months(chrono::Months::new(i as u32)).unwrap())
            .collect();
        build_rows(&dates, values)
    }

    #[test]
    fn linear_trend_recovers_line() {
        let values: Vec<f64> = (0..30).map(|i| 5.0 - 0.25 * i as f64).collect();
        let rows = rows_for(&values);
        let model = fit_model(ModelKind::LinearTrend, &rows).unwrap();
        let last = rows.last().unwrap();
        assert!((model.predict(&last.features) - last.target).abs() < 1e-9);
    }

    #[test]
    fn lag_regression_fits_training_rows() {
        let values: Vec<f64> = (0..48)
            .map(|i| {
                let t = i as f64;
                -0.1 * t + (t * std::f64::consts::PI / 6.0).sin()
            })
            .collect();
        let rows = rows_for(&values);
        let model = fit_model(ModelKind::LagRegression, &rows).unwrap();
        assert_eq!(model.kind(), ModelKind::LagRegression);
        let max_err = rows
            .iter()
            .map(|r| (model.predict(&r.features) - r.target).abs())
            .fold(0.0, f64::max);
        assert!(max_err < 1e-6, "max in-sample error {max_err}");
    }

    #[test]
    fn persistence_repeats_previous_value() {
        let values: Vec<f64> = (0..14).map(|i| i as f64 * 2.0).collect();
        let rows = rows_for(&values);
        let model = fit_model(ModelKind::Persistence, &rows).unwrap();
        assert_eq!(model.predict(&rows[0].features), 22.0);
    }

    #[test]
    fn standardizer_leaves_constant_columns_unscaled() {
        let values = [3.0; 20];
        let rows = rows_for(&values);
        let scaler = Standardizer::fit(&rows).unwrap();
        let z = scaler.transform(&rows[0].features);
        assert_eq!(z[LAG1_FEATURE], 0.0);
    }

    #[test]
    fn empty_training_set_is_insufficient() {
        assert!(matches!(
            fit_model(ModelKind::Persistence, &[]),
            Err(EngineError::InsufficientData { .. })
        ));
    }
}
