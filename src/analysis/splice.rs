//! Splicing the recent anomaly series onto the historical record.
//!
//! Each recent anomaly is converted into the historical unit and shifted so the
//! zero-anomaly level lands on the continuity anchor:
//!
//! ```text
//! spliced = offset + anomaly / unit_conversion_factor
//! ```
//!
//! Historical points pass through unchanged as `Measured`; spliced points are
//! `Estimated`. The physical meaning of the conversion factor is not checked.
//! No interpolation is done across the gap between the two date ranges.

use tracing::{info, warn};

use crate::domain::{CombinedSeries, OverlapPolicy, PointKind, Series, Source, SpliceCaveat, SpliceParams, TimePoint};
use crate::error::EngineError;

/// Combined series plus any soft caveats raised while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct SpliceOutput {
    pub combined: CombinedSeries,
    pub params: SpliceParams,
    pub caveats: Vec<SpliceCaveat>,
}

/// Default continuity anchor: the most recent historical value.
pub fn last_historical_value(historical: &Series) -> Option<f64> {
    historical.last().map(|p| p.value)
}

/// Join `historical` and the converted `recent_anomalies` into one series.
pub fn splice(
    historical: &Series,
    recent_anomalies: &Series,
    params: &SpliceParams,
    policy: OverlapPolicy,
) -> Result<SpliceOutput, EngineError> {
    validate_params(params)?;
    if historical.source() != Source::Historical || recent_anomalies.source() != Source::Recent {
        return Err(EngineError::InvalidSeries(format!(
            "splice expects historical + recent series, got {} + {}",
            historical.source(),
            recent_anomalies.source()
        )));
    }

    let mut caveats = Vec::new();
    if let Some(caveat) = detect_overlap(historical, recent_anomalies) {
        let SpliceCaveat::ConversionAssumptionViolation {
            last_historical,
            first_recent,
            ..
        } = caveat;
        match policy {
            OverlapPolicy::Reject => {
                return Err(EngineError::Overlap {
                    last_historical,
                    first_recent,
                });
            }
            OverlapPolicy::Warn => {
                warn!(%caveat, "splicing overlapping series");
                caveats.push(caveat);
            }
        }
    }

    let mut points: Vec<TimePoint> = Vec::with_capacity(historical.len() + recent_anomalies.len());
    points.extend(historical.points().iter().map(|p| TimePoint {
        kind: PointKind::Measured,
        ..*p
    }));
    for p in recent_anomalies.points() {
        let value = params.offset + p.value / params.unit_conversion_factor;
        if !value.is_finite() {
            return Err(EngineError::InvalidSeries(format!(
                "spliced value for {} is not finite",
                p.date
            )));
        }
        points.push(TimePoint::new(p.date, value, Source::Recent, PointKind::Estimated));
    }

    // Stable: on a shared date the historical point stays first.
    points.sort_by_key(|p| p.date);

    info!(
        historical = historical.len(),
        recent = recent_anomalies.len(),
        factor = params.unit_conversion_factor,
        offset = params.offset,
        "spliced series"
    );

    Ok(SpliceOutput {
        combined: CombinedSeries::from_sorted(points),
        params: *params,
        caveats,
    })
}

fn validate_params(params: &SpliceParams) -> Result<(), EngineError> {
    if !params.unit_conversion_factor.is_finite() || params.unit_conversion_factor == 0.0 {
        return Err(EngineError::InvalidParameter(format!(
            "unit conversion factor must be finite and non-zero (got {})",
            params.unit_conversion_factor
        )));
    }
    if !params.offset.is_finite() {
        return Err(EngineError::InvalidParameter(format!(
            "offset must be finite (got {})",
            params.offset
        )));
    }
    Ok(())
}

fn detect_overlap(historical: &Series, recent: &Series) -> Option<SpliceCaveat> {
    let last_historical = historical.last()?.date;
    let first_recent = recent.first()?.date;
    if first_recent > last_historical {
        return None;
    }
    let overlapping_recent_points = recent
        .points()
        .iter()
        .take_while(|p| p.date <= last_historical)
        .count();
    Some(SpliceCaveat::ConversionAssumptionViolation {
        last_historical,
        first_recent,
        overlapping_recent_points,
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::analysis::baseline::normalize;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn historical() -> Series {
        Series::from_pairs(
            Source::Historical,
            &[(d(2015, 1, 1), -5.0), (d(2016, 1, 1), -6.0), (d(2017, 1, 1), -8.73)],
        )
        .unwrap()
    }

    fn recent() -> Series {
        Series::from_pairs(
            Source::Recent,
            &[(d(2018, 1, 1), 200.0), (d(2018, 6, 1), 210.0), (d(2019, 1, 1), 190.0)],
        )
        .unwrap()
    }

    fn params() -> SpliceParams {
        SpliceParams {
            unit_conversion_factor: 10.0,
            offset: -8.73,
        }
    }

    #[test]
    fn grace_gldas_scenario() {
        let (baseline, anomalies) = normalize(&recent(), 2018).unwrap();
        assert_eq!(baseline.reference_value, 205.0);

        let out = splice(&historical(), &anomalies, &params(), OverlapPolicy::Warn).unwrap();
        assert!(out.caveats.is_empty());

        let points = out.combined.points();
        assert_eq!(points.len(), 6);
        assert!(points.windows(2).all(|w| w[0].date <= w[1].date));

        for p in &points[..3] {
            assert_eq!((p.source, p.kind), (Source::Historical, PointKind::Measured));
        }
        for p in &points[3..] {
            assert_eq!((p.source, p.kind), (Source::Recent, PointKind::Estimated));
        }

        let spliced: Vec<f64> = points[3..].iter().map(|p| p.value).collect();
        for (got, want) in spliced.iter().zip([-9.23, -8.23, -10.23]) {
            assert!((got - want).abs() < 1e-12, "{got} != {want}");
        }
        assert_eq!(points[2].value, -8.73);
    }

    #[test]
    fn zero_anomaly_lands_exactly_on_offset() {
        let anomalies = Series::from_pairs(Source::Recent, &[(d(2018, 1, 1), 0.0), (d(2018, 2, 1), 3.0)]).unwrap();
        let out = splice(&historical(), &anomalies, &params(), OverlapPolicy::Warn).unwrap();
        let first_recent = out.combined.portion(Source::Recent).next().unwrap();
        assert_eq!(first_recent.value, -8.73);
    }

    #[test]
    fn length_is_sum_of_inputs() {
        let (_, anomalies) = normalize(&recent(), 2018).unwrap();
        let out = splice(&historical(), &anomalies, &params(), OverlapPolicy::Warn).unwrap();
        assert_eq!(out.combined.len(), historical().len() + recent().len());
    }

    #[test]
    fn overlap_warns_by_default_and_can_reject() {
        let anomalies = Series::from_pairs(
            Source::Recent,
            &[(d(2016, 6, 1), 1.0), (d(2017, 1, 1), 2.0), (d(2018, 1, 1), 3.0)],
        )
        .unwrap();

        let out = splice(&historical(), &anomalies, &params(), OverlapPolicy::Warn).unwrap();
        assert_eq!(
            out.caveats,
            vec![SpliceCaveat::ConversionAssumptionViolation {
                last_historical: d(2017, 1, 1),
                first_recent: d(2016, 6, 1),
                overlapping_recent_points: 2,
            }]
        );
        // Still date-sorted; on the shared date the historical point comes first.
        let points = out.combined.points();
        assert!(points.windows(2).all(|w| w[0].date <= w[1].date));
        assert_eq!(points[3].date, d(2017, 1, 1));
        assert_eq!(points[3].source, Source::Historical);
        assert_eq!(points[4].source, Source::Recent);

        let err = splice(&historical(), &anomalies, &params(), OverlapPolicy::Reject).unwrap_err();
        assert!(matches!(err, EngineError::Overlap { .. }));
    }

    #[test]
    fn rejects_unusable_parameters() {
        let (_, anomalies) = normalize(&recent(), 2018).unwrap();
        for factor in [0.0, f64::NAN, f64::INFINITY] {
            let p = SpliceParams {
                unit_conversion_factor: factor,
                offset: 0.0,
            };
            assert!(matches!(
                splice(&historical(), &anomalies, &p, OverlapPolicy::Warn),
                Err(EngineError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn rejects_swapped_sources() {
        let err = splice(&recent(), &historical(), &params(), OverlapPolicy::Warn).unwrap_err();
        assert!(matches!(err, EngineError::InvalidSeries(_)));
    }

    #[test]
    fn anchor_defaults_to_last_historical_value() {
        assert_eq!(last_historical_value(&historical()), Some(-8.73));
    }
}
