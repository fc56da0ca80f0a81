//! Command-line parsing for the groundwater trend & splice pipeline.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the engine code. Every run option can also be set through a
//! `WATERTRACE_*` environment variable (a `.env` file is honoured).

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::domain::{OverlapPolicy, SamplingCadence, Source};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "watertrace", version, about = "Groundwater trend analysis and GRACE/GLDAS series splicing")]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load both series, compute trends, normalize, splice, and report.
    Run(RunArgs),
    /// Trend of a single series file.
    Trend(TrendArgs),
    /// Plot a previously exported run report JSON.
    Plot(PlotArgs),
    /// Print the district anomaly table.
    Districts(DistrictArgs),
    /// Pick the first available dataset from a candidate catalog JSON.
    SelectDataset(SelectArgs),
}

/// Options for the full pipeline.
#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    /// Historical (GRACE) series CSV.
    #[arg(long, value_name = "CSV", env = "WATERTRACE_HISTORICAL")]
    pub historical: PathBuf,

    /// Recent (GLDAS) series CSV.
    #[arg(long, value_name = "CSV", env = "WATERTRACE_RECENT")]
    pub recent: PathBuf,

    /// Date column of the historical file.
    #[arg(long, default_value = "date", env = "WATERTRACE_HISTORICAL_DATE_COLUMN")]
    pub historical_date_column: String,

    /// Value column of the historical file.
    #[arg(long, env = "WATERTRACE_HISTORICAL_VALUE_COLUMN")]
    pub historical_value_column: String,

    /// Date column of the recent file.
    #[arg(long, default_value = "date", env = "WATERTRACE_RECENT_DATE_COLUMN")]
    pub recent_date_column: String,

    /// Value column of the recent file.
    #[arg(long, env = "WATERTRACE_RECENT_VALUE_COLUMN")]
    pub recent_value_column: String,

    /// Unit label of historical values.
    #[arg(long, default_value = "cm", env = "WATERTRACE_HISTORICAL_UNIT")]
    pub historical_unit: String,

    /// Unit label of recent values.
    #[arg(long, default_value = "kg/m2", env = "WATERTRACE_RECENT_UNIT")]
    pub recent_unit: String,

    /// Sampling cadence of both series.
    #[arg(long, value_enum, default_value_t = SamplingCadence::Monthly, env = "WATERTRACE_CADENCE")]
    pub cadence: SamplingCadence,

    /// Calendar year of the recent series used as its baseline.
    #[arg(long, env = "WATERTRACE_BASELINE_YEAR")]
    pub baseline_year: i32,

    /// Recent units per one historical unit (e.g. 10 kg/m2 per cm).
    #[arg(long = "factor", env = "WATERTRACE_UNIT_CONVERSION_FACTOR")]
    pub unit_conversion_factor: f64,

    /// Continuity anchor in historical units (default: last historical value).
    #[arg(long, allow_negative_numbers = true, env = "WATERTRACE_OFFSET")]
    pub offset: Option<f64>,

    /// What to do when the recent series starts inside the historical date range.
    #[arg(long, value_enum, default_value_t = OverlapPolicy::Warn, env = "WATERTRACE_OVERLAP_POLICY")]
    pub overlap_policy: OverlapPolicy,

    /// Per-year slope magnitude below which a significant trend reads as stable.
    #[arg(long, default_value_t = 1.0, env = "WATERTRACE_STABLE_BAND")]
    pub stable_band: f64,

    /// Periods to forecast from the combined series (0 disables forecasting).
    #[arg(long, default_value_t = 0, env = "WATERTRACE_FORECAST_HORIZON")]
    pub forecast_horizon: usize,

    /// Render an ASCII plot in the terminal.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Write the run report to JSON.
    #[arg(long = "export-json", value_name = "JSON", env = "WATERTRACE_EXPORT_JSON")]
    pub export_json: Option<PathBuf>,

    /// Write the combined series to CSV.
    #[arg(long = "export-csv", value_name = "CSV", env = "WATERTRACE_EXPORT_CSV")]
    pub export_csv: Option<PathBuf>,
}

/// Options for a single-series trend.
#[derive(Debug, Args, Clone)]
pub struct TrendArgs {
    /// Series CSV.
    #[arg(value_name = "CSV")]
    pub input: PathBuf,

    #[arg(long, default_value = "date")]
    pub date_column: String,

    #[arg(long)]
    pub value_column: String,

    /// Which record the file holds (only affects provenance tags).
    #[arg(long, value_enum, default_value_t = Source::Historical)]
    pub source: Source,

    #[arg(long, value_enum, default_value_t = SamplingCadence::Monthly, env = "WATERTRACE_CADENCE")]
    pub cadence: SamplingCadence,

    #[arg(long, default_value_t = 1.0, env = "WATERTRACE_STABLE_BAND")]
    pub stable_band: f64,

    /// Unit label for the report.
    #[arg(long, default_value = "cm")]
    pub unit: String,
}

/// Options for plotting a saved run report.
#[derive(Debug, Args)]
pub struct PlotArgs {
    /// Report JSON produced by `watertrace run --export-json`.
    #[arg(long, value_name = "JSON")]
    pub report: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

#[derive(Debug, Args)]
pub struct DistrictArgs {
    /// Only show districts of this province.
    #[arg(long)]
    pub province: Option<String>,
}

#[derive(Debug, Args)]
pub struct SelectArgs {
    /// JSON array of dataset candidates, in preference order.
    #[arg(value_name = "JSON")]
    pub catalog: PathBuf,

    /// Only consider candidates for this role.
    #[arg(long, value_enum)]
    pub role: Option<Source>,
}
