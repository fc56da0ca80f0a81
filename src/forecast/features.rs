//! Feature construction for the forecasting models.
//!
//! Every feature of row `i` is computed from the calendar date of `i` and the
//! values strictly *before* `i`, so the same function serves both training and
//! recursive forecasting (where the "previous values" include predictions).

use chrono::{Datelike, NaiveDate};

/// Lags (in samples) fed to the regression.
pub const LAGS: [usize; 5] = [1, 2, 3, 6, 12];

/// Trailing-mean windows (in samples), excluding the current value.
pub const WINDOWS: [usize; 3] = [3, 6, 12];

/// Samples of history needed before the first complete feature row.
pub const MIN_HISTORY: usize = 12;

pub const N_FEATURES: usize = 3 + LAGS.len() + WINDOWS.len();

pub const FEATURE_NAMES: [&str; N_FEATURES] = [
    "month",
    "year",
    "linear_trend",
    "lag_1",
    "lag_2",
    "lag_3",
    "lag_6",
    "lag_12",
    "mean_prev_3",
    "mean_prev_6",
    "mean_prev_12",
];

/// Position of `linear_trend` in a feature vector.
pub const TREND_FEATURE: usize = 2;
/// Position of `lag_1` in a feature vector.
pub const LAG1_FEATURE: usize = 3;

pub type Features = [f64; N_FEATURES];

/// One supervised example: features of row `index` and its observed value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureRow {
    pub index: usize,
    pub date: NaiveDate,
    pub features: Features,
    pub target: f64,
}

/// Features for position `index` dated `date`, using `history[..index]`.
///
/// `None` when fewer than [`MIN_HISTORY`] previous values exist.
pub fn features_at(history: &[f64], index: usize, date: NaiveDate) -> Option<Features> {
    if index < MIN_HISTORY || index > history.len() {
        return None;
    }
    let mut out = [0.0; N_FEATURES];
    out[0] = f64::from(date.month());
    out[1] = f64::from(date.year());
    out[TREND_FEATURE] = index as f64;
    for (slot, &lag) in LAGS.iter().enumerate() {
        out[LAG1_FEATURE + slot] = history[index - lag];
    }
    let base = LAG1_FEATURE + LAGS.len();
    for (slot, &w) in WINDOWS.iter().enumerate() {
        let window = &history[index - w..index];
        out[base + slot] = window.iter().sum::<f64>() / w as f64;
    }
    Some(out)
}

/// Build every complete feature row of a dated value sequence.
pub fn build_rows(dates: &[NaiveDate], values: &[f64]) -> Vec<FeatureRow> {
    (MIN_HISTORY..values.len().min(dates.len()))
        .filter_map(|index| {
            let features = features_at(values, index, dates[index])?;
            Some(FeatureRow {
                index,
                date: dates[index],
                features,
                target: values[index],
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monthly_dates(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2002, 4, 1).unwrap();
        (0..n)
            .map(|i| start.checked_add_months(chrono::Months::new(i as u32)).unwrap())
            .collect()
    }

    #[test]
    fn first_row_starts_after_full_history() {
        let values: Vec<f64> = (0..15).map(|i| i as f64).collect();
        let rows = build_rows(&monthly_dates(15), &values);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].index, 12);
        assert_eq!(rows[0].target, 12.0);
    }

    #[test]
    fn features_use_only_previous_values() {
        let values: Vec<f64> = (0..13).map(|i| i as f64).collect();
        let dates = monthly_dates(13);
        let f = features_at(&values, 12, dates[12]).unwrap();
        // 2002-04 + 12 months = 2003-04
        assert_eq!(f[0], 4.0);
        assert_eq!(f[1], 2003.0);
        assert_eq!(f[TREND_FEATURE], 12.0);
        assert_eq!(&f[LAG1_FEATURE..LAG1_FEATURE + 5], &[11.0, 10.0, 9.0, 6.0, 0.0]);
        // Means of [9,10,11], [6..=11], [0..=11].
        assert_eq!(&f[8..], &[10.0, 8.5, 5.5]);
    }

    #[test]
    fn insufficient_history_gives_none() {
        let values = [1.0; 5];
        let dates = monthly_dates(5);
        assert!(features_at(&values, 4, dates[4]).is_none());
        assert!(build_rows(&dates, &values).is_empty());
    }
}
