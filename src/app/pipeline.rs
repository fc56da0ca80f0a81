//! Shared pipeline logic behind the `run` command.
//!
//! Keeping this in one place keeps the workflow testable without a process:
//! load both series -> trends -> baseline -> splice -> (forecast) -> report
//!
//! The CLI then only handles presentation (printing, plotting, exports).

use tracing::info;

use crate::analysis::{
    SeriesSummary, annual_means, estimate_trend, interpret, last_historical_value, monthly_climatology, normalize,
    splice, summarize, year_over_year,
};
use crate::domain::{CombinedSeries, PipelineConfig, SamplingCadence, Series, SeriesInput, Source, SpliceParams};
use crate::error::{AppError, EngineError};
use crate::forecast::run_forecast;
use crate::io::ingest::{IngestedSeries, load_series};
use crate::io::report::{RunReport, SeriesReport};

/// All computed outputs of a single `watertrace run`.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub historical: IngestedSeries,
    pub recent: IngestedSeries,
    pub combined: CombinedSeries,
    pub report: RunReport,
}

/// Execute the full pipeline and return the computed outputs.
pub fn run_pipeline(config: &PipelineConfig) -> Result<RunOutput, AppError> {
    config.validate()?;

    // 1) Load.
    let historical = load(&config.historical, Source::Historical)?;
    let recent = load(&config.recent, Source::Recent)?;

    // 2) Independent trends.
    let historical_report = series_report(&historical, &config.historical.unit, config.cadence, config.stable_band)?;
    let recent_report = series_report(&recent, &config.recent.unit, config.cadence, config.stable_band)?;

    // 3) Baseline + anomalies.
    let (baseline, anomalies) = normalize(&recent.series, config.baseline_year)?;

    // 4) Splice.
    let offset = match config.offset {
        Some(offset) => offset,
        None => last_historical_value(&historical.series).ok_or(EngineError::InsufficientData {
            what: "splice offset",
            needed: 1,
            got: 0,
        })?,
    };
    let params = SpliceParams {
        unit_conversion_factor: config.unit_conversion_factor,
        offset,
    };
    let spliced = splice(&historical.series, &anomalies, &params, config.overlap_policy)?;

    // 5) Recent trend in historical units.
    let converted = Series::new(
        Source::Recent,
        spliced.combined.portion(Source::Recent).copied().collect(),
    )?;
    let recent_trend_converted = estimate_trend(&converted, config.cadence)?;

    // 6) Optional forecast.
    let forecast = if config.forecast_horizon > 0 {
        Some(run_forecast(
            spliced.combined.points(),
            config.cadence,
            config.forecast_horizon,
        )?)
    } else {
        None
    };

    let report = RunReport {
        tool: "watertrace".to_string(),
        cadence: config.cadence,
        historical: historical_report,
        recent: recent_report,
        baseline,
        splice: spliced.params,
        caveats: spliced.caveats,
        recent_trend_converted,
        annual_means: annual_means(spliced.combined.points()),
        combined: spliced.combined.points().to_vec(),
        forecast,
    };

    info!(
        combined = spliced.combined.len(),
        caveats = report.caveats.len(),
        "pipeline complete"
    );

    Ok(RunOutput {
        historical,
        recent,
        combined: spliced.combined,
        report,
    })
}

/// Write the configured JSON/CSV artifacts for `output`.
pub fn write_outputs(config: &PipelineConfig, output: &RunOutput) -> Result<(), AppError> {
    if let Some(path) = &config.export_json {
        crate::io::report::write_report_json(path, &output.report)?;
        info!(path = %path.display(), "wrote run report");
    }
    if let Some(path) = &config.export_csv {
        crate::io::export::write_combined_csv(path, &output.combined)?;
        info!(path = %path.display(), "wrote combined series");
    }
    Ok(())
}

/// Load one input file.
pub fn load(input: &SeriesInput, source: Source) -> Result<IngestedSeries, AppError> {
    Ok(load_series(&input.path, &input.columns, source)?)
}

/// Load stats, summary, trend, year-over-year changes and seasonal cycle of one series.
pub fn series_report(
    ingested: &IngestedSeries,
    unit: &str,
    cadence: SamplingCadence,
    stable_band: f64,
) -> Result<SeriesReport, EngineError> {
    let (summary, trend) = summary_and_trend(&ingested.series, cadence)?;
    Ok(SeriesReport {
        unit: unit.to_string(),
        rows_read: ingested.rows_read,
        rows_dropped: ingested.rows_dropped(),
        duplicate_dates: ingested.duplicate_dates,
        summary,
        interpretation: interpret(&trend, stable_band),
        trend,
        year_over_year: year_over_year(&annual_means(ingested.series.points())),
        seasonal: monthly_climatology(&ingested.series),
    })
}

/// Summary statistics and trend of one series.
pub fn summary_and_trend(
    series: &Series,
    cadence: SamplingCadence,
) -> Result<(SeriesSummary, crate::domain::TrendResult), EngineError> {
    let summary = summarize(series).ok_or(EngineError::InsufficientData {
        what: "series summary",
        needed: 1,
        got: 0,
    })?;
    let trend = estimate_trend(series, cadence)?;
    Ok((summary, trend))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::domain::config::tests::sample_config;
    use crate::domain::{OverlapPolicy, PointKind, SpliceCaveat};

    fn write(path: &Path, rows: &[(&str, f64)]) {
        let mut text = String::from("date,groundwater_cm\n");
        for (date, value) in rows {
            text.push_str(&format!("{date},{value}\n"));
        }
        std::fs::write(path, text).unwrap();
    }

    fn monthly_rows(start_year: i32, months: usize, f: impl Fn(usize) -> f64) -> Vec<(String, f64)> {
        (0..months)
            .map(|i| {
                let year = start_year + (i / 12) as i32;
                let month = i % 12 + 1;
                (format!("{year}-{month:02}-01"), f(i))
            })
            .collect()
    }

    fn config_in(dir: &Path) -> PipelineConfig {
        let mut config = sample_config();
        config.historical.path = dir.join("grace.csv");
        config.recent.path = dir.join("gldas.csv");
        config
    }

    #[test]
    fn grace_gldas_scenario_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        write(
            &config.historical.path,
            &[("2015-01-01", -5.0), ("2016-01-01", -6.0), ("2017-01-01", -8.73)],
        );
        write(
            &config.recent.path,
            &[("2018-01-01", 200.0), ("2018-06-01", 210.0), ("2019-01-01", 190.0)],
        );

        let out = run_pipeline(&config).unwrap();
        assert_eq!(out.report.baseline.reference_value, 205.0);
        assert_eq!(out.report.splice.offset, -8.73);
        assert!(out.report.caveats.is_empty());

        let points = out.combined.points();
        assert_eq!(points.len(), 6);
        for p in &points[..3] {
            assert_eq!((p.source, p.kind), (Source::Historical, PointKind::Measured));
        }
        let spliced: Vec<f64> = points[3..].iter().map(|p| p.value).collect();
        for (got, want) in spliced.iter().zip([-9.23, -8.23, -10.23]) {
            assert!((got - want).abs() < 1e-9, "{got} vs {want}");
        }
        for p in &points[3..] {
            assert_eq!((p.source, p.kind), (Source::Recent, PointKind::Estimated));
        }
        assert_eq!(out.report.recent_trend_converted.n_points, 3);

        let yoy = &out.report.historical.year_over_year;
        assert_eq!(yoy.iter().map(|y| y.year).collect::<Vec<_>>(), vec![2016, 2017]);
        assert!((yoy[0].value + 1.0).abs() < 1e-9);
        assert!((yoy[1].value + 2.73).abs() < 1e-9);

        let seasonal = &out.report.recent.seasonal;
        assert_eq!(seasonal.iter().map(|m| (m.month, m.n_points)).collect::<Vec<_>>(), vec![(1, 2), (6, 1)]);
        assert_eq!(seasonal[0].mean, 195.0);
        assert_eq!(seasonal[1].mean, 210.0);
        assert!(out.report.forecast.is_none());
    }

    #[test]
    fn repeated_runs_write_identical_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.forecast_horizon = 3;

        let hist = monthly_rows(2015, 24, |i| -0.08 * i as f64 + ((i % 12) as f64 * 0.5).sin());
        let recent = monthly_rows(2018, 24, |i| 205.0 - 0.3 * i as f64 + ((i % 12) as f64 * 0.5).cos());
        fn borrow(rows: &[(String, f64)]) -> Vec<(&str, f64)> {
            rows.iter().map(|(d, v)| (d.as_str(), *v)).collect()
        }
        write(&config.historical.path, &borrow(&hist));
        write(&config.recent.path, &borrow(&recent));

        let mut artifacts = Vec::new();
        for run in 0..2 {
            config.export_json = Some(dir.path().join(format!("run{run}.json")));
            config.export_csv = Some(dir.path().join(format!("run{run}.csv")));
            let out = run_pipeline(&config).unwrap();
            assert_eq!(out.report.forecast.as_ref().unwrap().points.len(), 3);
            write_outputs(&config, &out).unwrap();
            artifacts.push((
                std::fs::read(config.export_json.as_ref().unwrap()).unwrap(),
                std::fs::read(config.export_csv.as_ref().unwrap()).unwrap(),
            ));
        }
        assert_eq!(artifacts[0], artifacts[1]);

        let csv = String::from_utf8(artifacts[0].1.clone()).unwrap();
        assert!(csv.starts_with("date,value,source,kind\n"));
        assert_eq!(csv.lines().count(), 1 + 48);
    }

    #[test]
    fn overlap_policy_is_honoured() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        write(
            &config.historical.path,
            &[("2017-01-01", -5.0), ("2018-03-01", -6.0)],
        );
        write(
            &config.recent.path,
            &[("2018-01-01", 200.0), ("2018-06-01", 210.0)],
        );

        let out = run_pipeline(&config).unwrap();
        assert!(matches!(
            out.report.caveats.as_slice(),
            [SpliceCaveat::ConversionAssumptionViolation { .. }]
        ));

        config.overlap_policy = OverlapPolicy::Reject;
        let err = run_pipeline(&config).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn single_row_loads_but_has_no_trend() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        write(&config.historical.path, &[("2017-01-01", -8.73)]);
        write(
            &config.recent.path,
            &[("2018-01-01", 200.0), ("2018-06-01", 210.0)],
        );

        let loaded = load(&config.historical, Source::Historical).unwrap();
        assert_eq!(loaded.series.len(), 1);

        let err = summary_and_trend(&loaded.series, config.cadence).unwrap_err();
        assert!(matches!(err, EngineError::InsufficientData { needed: 2, got: 1, .. }));
        assert_eq!(run_pipeline(&config).unwrap_err().exit_code(), 3);
    }

    #[test]
    fn missing_baseline_year_is_insufficient_data() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.baseline_year = 2020;
        write(
            &config.historical.path,
            &[("2016-01-01", -6.0), ("2017-01-01", -8.73)],
        );
        write(
            &config.recent.path,
            &[("2018-01-01", 200.0), ("2018-06-01", 210.0)],
        );
        let err = run_pipeline(&config).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("2020"));
    }

    #[test]
    fn missing_file_is_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        assert_eq!(run_pipeline(&config).unwrap_err().exit_code(), 2);
    }
}
