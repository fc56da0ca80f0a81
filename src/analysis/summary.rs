//! Descriptive statistics for a single series: overall summary, annual means,
//! year-over-year changes and the monthly climatology (seasonal cycle).

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::{Series, TimePoint};
use crate::math::stats::{mean, min_max, sample_std};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub n_points: usize,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub mean: f64,
    /// Sample standard deviation; `None` for a single point.
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
    /// Last value minus first value.
    pub total_change: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearValue {
    pub year: i32,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthStats {
    pub month: u32,
    pub n_points: usize,
    pub mean: f64,
    pub std: Option<f64>,
}

/// `None` only for an empty series.
pub fn summarize(series: &Series) -> Option<SeriesSummary> {
    let values: Vec<f64> = series.values().collect();
    let (min, max) = min_max(&values)?;
    let first = series.first()?;
    let last = series.last()?;
    Some(SeriesSummary {
        n_points: values.len(),
        start: first.date,
        end: last.date,
        mean: mean(&values)?,
        std: sample_std(&values),
        min,
        max,
        total_change: last.value - first.value,
    })
}

/// Mean value per calendar year, ascending by year.
///
/// Takes bare points so it also applies to a combined series.
pub fn annual_means(points: &[TimePoint]) -> Vec<YearValue> {
    let mut by_year: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
    for p in points {
        by_year.entry(p.date.year()).or_default().push(p.value);
    }
    by_year
        .into_iter()
        .filter_map(|(year, values)| Some(YearValue { year, value: mean(&values)? }))
        .collect()
}

/// Difference between consecutive annual means, labelled with the later year.
///
/// Years missing from the record are not bridged: the change is always against
/// the previous year *present* in `annual`.
pub fn year_over_year(annual: &[YearValue]) -> Vec<YearValue> {
    annual
        .windows(2)
        .map(|w| YearValue {
            year: w[1].year,
            value: w[1].value - w[0].value,
        })
        .collect()
}

/// Mean/std of all values falling in each calendar month (1–12), months with no
/// data omitted.
pub fn monthly_climatology(series: &Series) -> Vec<MonthStats> {
    let mut by_month: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for p in series.points() {
        by_month.entry(p.date.month()).or_default().push(p.value);
    }
    by_month
        .into_iter()
        .filter_map(|(month, values)| {
            Some(MonthStats {
                month,
                n_points: values.len(),
                mean: mean(&values)?,
                std: sample_std(&values),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Source;

    fn d(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn series() -> Series {
        Series::from_pairs(
            Source::Recent,
            &[
                (d(2018, 1), 200.0),
                (d(2018, 7), 210.0),
                (d(2019, 1), 190.0),
                (d(2019, 7), 194.0),
                (d(2021, 1), 180.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn summary_covers_range_and_change() {
        let s = summarize(&series()).unwrap();
        assert_eq!(s.n_points, 5);
        assert_eq!((s.start, s.end), (d(2018, 1), d(2021, 1)));
        assert_eq!(s.mean, 194.8);
        assert_eq!((s.min, s.max), (180.0, 210.0));
        assert_eq!(s.total_change, -20.0);
        assert!(s.std.unwrap() > 0.0);
    }

    #[test]
    fn annual_and_year_over_year() {
        let annual = annual_means(series().points());
        assert_eq!(
            annual,
            vec![
                YearValue { year: 2018, value: 205.0 },
                YearValue { year: 2019, value: 192.0 },
                YearValue { year: 2021, value: 180.0 },
            ]
        );
        let yoy = year_over_year(&annual);
        assert_eq!(
            yoy,
            vec![
                YearValue { year: 2019, value: -13.0 },
                YearValue { year: 2021, value: -12.0 },
            ]
        );
    }

    #[test]
    fn climatology_groups_by_month() {
        let clim = monthly_climatology(&series());
        assert_eq!(clim.len(), 2);
        assert_eq!(clim[0].month, 1);
        assert_eq!(clim[0].n_points, 3);
        assert!((clim[0].mean - 190.0).abs() < 1e-12);
        assert_eq!(clim[1].month, 7);
        assert_eq!(clim[1].mean, 202.0);
    }
}
