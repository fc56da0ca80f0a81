//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - installs the log subscriber
//! - runs the pipeline or one of the auxiliary commands
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;
use tracing::warn;

use crate::cli::{Command, DistrictArgs, PlotArgs, RunArgs, SelectArgs, TrendArgs};
use crate::domain::{ColumnMapping, PipelineConfig, SeriesInput};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `watertrace` binary.
pub fn run() -> Result<(), AppError> {
    // Before parsing so `.env` can supply `WATERTRACE_*` defaults.
    dotenvy::dotenv().ok();

    let cli = crate::cli::Cli::parse();
    crate::logging::init(cli.verbose);

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Trend(args) => handle_trend(args),
        Command::Plot(args) => handle_plot(args),
        Command::Districts(args) => handle_districts(args),
        Command::SelectDataset(args) => handle_select(args),
    }
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let config = pipeline_config_from_args(&args);
    let run = pipeline::run_pipeline(&config)?;

    println!("{}", crate::report::format_run_summary(&run.report));

    if config.plot {
        let forecast = run.report.forecast.as_ref().map(|f| f.points.as_slice());
        let plot = crate::plot::render_ascii_plot(
            run.combined.points(),
            forecast,
            config.plot_width,
            config.plot_height,
            &config.historical.unit,
        );
        println!("{plot}");
    }

    pipeline::write_outputs(&config, &run)
}

fn handle_trend(args: TrendArgs) -> Result<(), AppError> {
    let input = SeriesInput {
        path: args.input.clone(),
        columns: ColumnMapping::new(&args.date_column, &args.value_column),
        unit: args.unit.clone(),
    };
    let ingested = pipeline::load(&input, args.source)?;
    if !ingested.row_errors.is_empty() {
        for e in ingested.row_errors.iter().take(5) {
            warn!(line = e.line, "{}", e.message);
        }
    }
    let report = pipeline::series_report(&ingested, &args.unit, args.cadence, args.stable_band)?;
    let label = format!("{} series '{}'", args.source, args.input.display());
    println!("{}", crate::report::format_series_report(&label, &report));
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let report = crate::io::report::read_report_json(&args.report)?;
    let forecast = report.forecast.as_ref().map(|f| f.points.as_slice());
    let plot = crate::plot::render_ascii_plot(
        &report.combined,
        forecast,
        args.width,
        args.height,
        &report.historical.unit,
    );
    println!("{plot}");
    Ok(())
}

fn handle_districts(args: DistrictArgs) -> Result<(), AppError> {
    use crate::data::{DISTRICTS, district_summary, districts_in};

    let selected: Vec<_> = match &args.province {
        Some(province) => districts_in(&DISTRICTS, province).copied().collect(),
        None => DISTRICTS.to_vec(),
    };
    if selected.is_empty() {
        return Err(AppError::new(
            2,
            format!("Unknown province '{}'.", args.province.unwrap_or_default()),
        ));
    }
    let summary = district_summary(&selected);
    println!("{}", crate::report::format_districts(&selected, summary.as_ref()));
    Ok(())
}

fn handle_select(args: SelectArgs) -> Result<(), AppError> {
    let candidates = crate::data::read_candidates(&args.catalog)?;
    let selection = crate::data::select_best(&candidates, |c| args.role.is_none_or(|role| c.role == role));
    print!("{}", crate::report::format_catalog_selection(&selection));
    if selection.chosen.is_none() {
        return Err(AppError::new(3, "No dataset candidate is available."));
    }
    Ok(())
}

pub fn pipeline_config_from_args(args: &RunArgs) -> PipelineConfig {
    PipelineConfig {
        historical: SeriesInput {
            path: args.historical.clone(),
            columns: ColumnMapping::new(&args.historical_date_column, &args.historical_value_column),
            unit: args.historical_unit.clone(),
        },
        recent: SeriesInput {
            path: args.recent.clone(),
            columns: ColumnMapping::new(&args.recent_date_column, &args.recent_value_column),
            unit: args.recent_unit.clone(),
        },
        cadence: args.cadence,
        baseline_year: args.baseline_year,
        unit_conversion_factor: args.unit_conversion_factor,
        offset: args.offset,
        overlap_policy: args.overlap_policy,
        stable_band: args.stable_band,
        forecast_horizon: args.forecast_horizon,
        plot: args.plot,
        plot_width: args.width,
        plot_height: args.height,
        export_json: args.export_json.clone(),
        export_csv: args.export_csv.clone(),
    }
}
