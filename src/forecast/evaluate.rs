//! Model evaluation and selection.
//!
//! Each model is scored with an expanding-window time-series split: fold `k`
//! trains on everything before its test block, so no fold ever sees the future.
//!
//! Selection rules:
//! 1. Skip models that fail to fit on any fold (reason kept for diagnostics)
//! 2. Choose the model with the highest mean cross-validated R²
//! 3. On an exact tie keep the simpler model

use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::EngineError;
use crate::forecast::features::FeatureRow;
use crate::forecast::model::{FittedModel, ModelKind, fit_model};
use crate::math::stats::{mean, population_std};

/// Number of cross-validation folds.
pub const CV_FOLDS: usize = 5;

/// Feature rows needed so every training fold has at least two rows.
pub const MIN_ROWS: usize = 2 * (CV_FOLDS + 1);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub r2: f64,
    pub rmse: f64,
    pub mae: f64,
}

/// Goodness-of-fit of `predicted` against `actual`.
///
/// R² of a constant target is 1 for a perfect prediction and 0 otherwise.
pub fn metrics(actual: &[f64], predicted: &[f64]) -> Metrics {
    let n = actual.len().min(predicted.len());
    if n == 0 {
        return Metrics {
            r2: 0.0,
            rmse: 0.0,
            mae: 0.0,
        };
    }
    let actual = &actual[..n];
    let y_mean = actual.iter().sum::<f64>() / n as f64;

    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    let mut abs_sum = 0.0;
    for (&a, &p) in actual.iter().zip(predicted) {
        ss_res += (a - p) * (a - p);
        ss_tot += (a - y_mean) * (a - y_mean);
        abs_sum += (a - p).abs();
    }

    let r2 = if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else if ss_res == 0.0 {
        1.0
    } else {
        0.0
    };

    Metrics {
        r2,
        rmse: (ss_res / n as f64).sqrt(),
        mae: abs_sum / n as f64,
    }
}

/// Expanding-window `(train, test)` index ranges over `n` rows.
///
/// Test blocks have `n / (folds + 1)` rows and end at `n`; returns an empty list
/// when that block size would be zero.
pub fn time_series_splits(n: usize, folds: usize) -> Vec<(Range<usize>, Range<usize>)> {
    let test_size = n / (folds + 1);
    if folds == 0 || test_size == 0 {
        return Vec::new();
    }
    let first_test = n - folds * test_size;
    (0..folds)
        .map(|k| {
            let start = first_test + k * test_size;
            (0..start, start..start + test_size)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEvaluation {
    pub model: ModelKind,
    pub cv_r2: Vec<f64>,
    pub cv_mean: f64,
    pub cv_std: f64,
    /// Fit quality of the model refitted on all rows.
    pub in_sample: Metrics,
}

#[derive(Debug, Clone)]
pub struct ForecastSelection {
    pub best: FittedModel,
    pub evaluations: Vec<ModelEvaluation>,
    pub skipped: Vec<(ModelKind, String)>,
}

/// Cross-validate every model, pick the best, and refit it on all rows.
pub fn evaluate_and_select(rows: &[FeatureRow]) -> Result<ForecastSelection, EngineError> {
    if rows.len() < MIN_ROWS {
        return Err(EngineError::InsufficientData {
            what: "forecast cross-validation",
            needed: MIN_ROWS,
            got: rows.len(),
        });
    }
    let splits = time_series_splits(rows.len(), CV_FOLDS);

    let mut evaluations = Vec::new();
    let mut fitted = Vec::new();
    let mut skipped = Vec::new();

    for kind in ModelKind::ALL {
        match evaluate_model(kind, rows, &splits) {
            Ok((evaluation, model)) => {
                debug!(
                    model = kind.display_name(),
                    cv_mean = evaluation.cv_mean,
                    r2 = evaluation.in_sample.r2,
                    "evaluated forecast model"
                );
                evaluations.push(evaluation);
                fitted.push(model);
            }
            Err(e) => skipped.push((kind, e.to_string())),
        }
    }

    let mut best_idx: Option<usize> = None;
    for (idx, evaluation) in evaluations.iter().enumerate() {
        let better = match best_idx {
            None => true,
            Some(b) => evaluation.cv_mean > evaluations[b].cv_mean,
        };
        if better {
            best_idx = Some(idx);
        }
    }
    let best_idx = best_idx.ok_or_else(|| EngineError::Solver("no forecast model could be fitted".to_string()))?;

    info!(
        model = evaluations[best_idx].model.display_name(),
        cv_mean = evaluations[best_idx].cv_mean,
        "selected forecast model"
    );

    Ok(ForecastSelection {
        best: fitted.swap_remove(best_idx),
        evaluations,
        skipped,
    })
}

fn evaluate_model(
    kind: ModelKind,
    rows: &[FeatureRow],
    splits: &[(Range<usize>, Range<usize>)],
) -> Result<(ModelEvaluation, FittedModel), EngineError> {
    let mut cv_r2 = Vec::with_capacity(splits.len());
    for (train, test) in splits {
        let model = fit_model(kind, &rows[train.clone()])?;
        let test_rows = &rows[test.clone()];
        let actual: Vec<f64> = test_rows.iter().map(|r| r.target).collect();
        let predicted: Vec<f64> = test_rows.iter().map(|r| model.predict(&r.features)).collect();
        cv_r2.push(metrics(&actual, &predicted).r2);
    }

    let model = fit_model(kind, rows)?;
    let actual: Vec<f64> = rows.iter().map(|r| r.target).collect();
    let predicted: Vec<f64> = rows.iter().map(|r| model.predict(&r.features)).collect();

    let evaluation = ModelEvaluation {
        model: kind,
        cv_mean: mean(&cv_r2).unwrap_or(f64::NAN),
        cv_std: population_std(&cv_r2).unwrap_or(f64::NAN),
        cv_r2,
        in_sample: metrics(&actual, &predicted),
    };
    Ok((evaluation, model))
}
