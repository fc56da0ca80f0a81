//! Baseline normalization.
//!
//! The recent source reports an absolute level in its own unit. To make it
//! comparable with the historical anomaly record we re-express it as a deviation
//! from its mean over one reference calendar year.

use tracing::info;

use crate::domain::{Baseline, Series, TimePoint};
use crate::error::EngineError;
use crate::math::stats::mean;

/// Mean of every value dated within `year`.
pub fn compute_baseline(series: &Series, year: i32) -> Result<Baseline, EngineError> {
    let window: Vec<f64> = series.in_year(year).map(|p| p.value).collect();
    let reference_value = mean(&window).ok_or(EngineError::EmptyWindow { year })?;

    info!(year, n = window.len(), reference_value, "computed baseline");
    Ok(Baseline {
        reference_value,
        reference_window: year,
        n_points: window.len(),
    })
}

/// Replace each value with `value - reference_value`; everything else is kept.
///
/// Fails only if a subtraction overflows to a non-finite value.
pub fn anomaly_series(series: &Series, baseline: &Baseline) -> Result<Series, EngineError> {
    let points = series
        .points()
        .iter()
        .map(|p| TimePoint {
            value: p.value - baseline.reference_value,
            ..*p
        })
        .collect();
    Series::new(series.source(), points)
}

/// Compute the baseline for `year` and the resulting anomaly series.
pub fn normalize(series: &Series, year: i32) -> Result<(Baseline, Series), EngineError> {
    let baseline = compute_baseline(series, year)?;
    let anomalies = anomaly_series(series, &baseline)?;
    Ok((baseline, anomalies))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{PointKind, Source};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn recent() -> Series {
        Series::from_pairs(
            Source::Recent,
            &[(d(2018, 1, 1), 200.0), (d(2018, 6, 1), 210.0), (d(2019, 1, 1), 190.0)],
        )
        .unwrap()
    }

    #[test]
    fn baseline_is_mean_of_reference_year() {
        let baseline = compute_baseline(&recent(), 2018).unwrap();
        assert_eq!(baseline.reference_value, 205.0);
        assert_eq!(baseline.reference_window, 2018);
        assert_eq!(baseline.n_points, 2);
    }

    #[test]
    fn anomalies_subtract_reference_and_keep_tags() {
        let (_, anomalies) = normalize(&recent(), 2018).unwrap();
        let values: Vec<f64> = anomalies.values().collect();
        assert_eq!(values, [-5.0, 5.0, -15.0]);
        assert!(anomalies.points().iter().all(|p| p.source == Source::Recent));
        assert!(anomalies.points().iter().all(|p| p.kind == PointKind::Measured));
        assert_eq!(anomalies.points()[2].date, d(2019, 1, 1));
    }

    #[test]
    fn empty_window_fails() {
        let err = compute_baseline(&recent(), 2020).unwrap_err();
        assert!(matches!(err, EngineError::EmptyWindow { year: 2020 }));
    }
}
