//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the engine code stays clean and testable
//! - output changes are localized

use crate::analysis::{MonthStats, SeriesSummary, YearValue};
use crate::data::{CatalogSelection, District, DistrictSummary};
use crate::domain::TrendResult;
use crate::forecast::ForecastReport;
use crate::io::report::{RunReport, SeriesReport};

/// Format the full run summary (load stats, trends, baseline, splice, forecast).
pub fn format_run_summary(report: &RunReport) -> String {
    let mut out = String::new();

    out.push_str("=== watertrace - groundwater trend & splice ===\n");
    out.push_str(&format!("Cadence: {}\n", report.cadence.as_str()));

    out.push_str(&format_series_report("Historical", &report.historical));
    out.push_str(&format_series_report("Recent", &report.recent));

    let hist_unit = &report.historical.unit;
    let recent_unit = &report.recent.unit;

    out.push_str("\nBaseline:\n");
    out.push_str(&format!(
        "- year {} | reference={:.3} {recent_unit} | n={}\n",
        report.baseline.reference_window, report.baseline.reference_value, report.baseline.n_points
    ));

    out.push_str("\nSplice:\n");
    out.push_str(&format!(
        "- factor={} {recent_unit} per {hist_unit} | offset={:.3} {hist_unit}\n",
        report.splice.unit_conversion_factor, report.splice.offset
    ));
    for caveat in &report.caveats {
        out.push_str(&format!("! caveat: {caveat}\n"));
    }

    let measured = report.combined.iter().filter(|p| p.kind == crate::domain::PointKind::Measured).count();
    let estimated = report.combined.len() - measured;
    out.push_str(&format!(
        "- combined: n={} ({measured} measured, {estimated} estimated)",
        report.combined.len()
    ));
    if let (Some(first), Some(last)) = (report.combined.first(), report.combined.last()) {
        out.push_str(&format!(" | {} .. {}", first.date, last.date));
    }
    out.push('\n');
    out.push_str(&format!(
        "- recent trend in {hist_unit}: {}\n",
        fmt_trend(&report.recent_trend_converted, hist_unit)
    ));

    if !report.annual_means.is_empty() {
        out.push_str(&format!("\nAnnual means ({hist_unit}):\n"));
        for yv in &report.annual_means {
            out.push_str(&format!("  {} {:>10.3}\n", yv.year, yv.value));
        }
    }

    if let Some(forecast) = &report.forecast {
        out.push('\n');
        out.push_str(&format_forecast(forecast, hist_unit));
    }

    out
}

/// One series block: load stats, summary, trend and its reading.
pub fn format_series_report(label: &str, series: &SeriesReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("\n{label} ({}):\n", series.unit));
    out.push_str(&format!(
        "- rows: read={} dropped={} duplicate dates={}\n",
        series.rows_read, series.rows_dropped, series.duplicate_dates
    ));
    out.push_str(&format!("- {}\n", fmt_summary(&series.summary)));
    out.push_str(&format!("- trend: {}\n", fmt_trend(&series.trend, &series.unit)));
    out.push_str(&format!("- reading: {}\n", series.interpretation.describe()));
    out.push_str(&format!("- year over year: {}\n", fmt_year_over_year(&series.year_over_year)));
    out.push_str(&format!("- seasonal cycle: {}\n", fmt_seasonal(&series.seasonal)));
    out
}

const MONTHS: [&str; 12] = ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"];

fn fmt_year_over_year(changes: &[YearValue]) -> String {
    if changes.is_empty() {
        return "n/a".to_string();
    }
    changes
        .iter()
        .map(|c| format!("{} {:+.3}", c.year, c.value))
        .collect::<Vec<_>>()
        .join(", ")
}

fn fmt_seasonal(months: &[MonthStats]) -> String {
    if months.is_empty() {
        return "n/a".to_string();
    }
    months
        .iter()
        .map(|m| {
            let name = MONTHS.get(m.month.saturating_sub(1) as usize).copied().unwrap_or("?");
            format!("{name} {:.3} (n={})", m.mean, m.n_points)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn fmt_summary(s: &SeriesSummary) -> String {
    let std = s.std.map_or_else(|| "n/a".to_string(), |v| format!("{v:.3}"));
    format!(
        "n={} | {} .. {} | mean={:.3} std={std} | y=[{:.3}, {:.3}] | change={:.3}",
        s.n_points, s.start, s.end, s.mean, s.min, s.max, s.total_change
    )
}

fn fmt_trend(t: &TrendResult, unit: &str) -> String {
    format!(
        "{:.4} {unit}/period, {:.3} {unit}/yr | r²={:.3} p={:.4} se={:.4} | {}",
        t.slope_per_period,
        t.slope_annualized,
        t.r_squared,
        t.p_value,
        t.std_err,
        if t.significant { "significant" } else { "not significant" }
    )
}

/// Model diagnostics and forecast table.
pub fn format_forecast(forecast: &ForecastReport, unit: &str) -> String {
    let mut out = String::new();
    out.push_str("Forecast model diagnostics:\n");
    for e in &forecast.evaluations {
        let chosen = if e.model == forecast.selected { "*" } else { " " };
        out.push_str(&format!(
            "{chosen} {:<15} CV R²={:.3} (±{:.3}) | in-sample R²={:.3} RMSE={:.3} MAE={:.3}\n",
            e.model.display_name(),
            e.cv_mean,
            e.cv_std,
            e.in_sample.r2,
            e.in_sample.rmse,
            e.in_sample.mae
        ));
    }
    for (kind, reason) in &forecast.skipped {
        out.push_str(&format!("  (skipped {}) {reason}\n", kind.display_name()));
    }

    if !forecast.points.is_empty() {
        out.push_str(&format!("\nForecast ({}):\n", forecast.selected.display_name()));
        for p in &forecast.points {
            out.push_str(&format!("  {} {:>10.3} {unit}\n", p.date, p.value));
        }
    }
    out
}

/// District table plus summary.
pub fn format_districts(districts: &[District], summary: Option<&DistrictSummary>) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<20} {:<18} {:>10} {:<10}\n",
            "province", "district", "anomaly", "status"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<20} {:-<18} {:-<10} {:-<10}\n", "", "", "", "").trim_end());
    out.push('\n');
    for d in districts {
        out.push_str(
            format!(
                "{:<20} {:<18} {:>10.1} {:<10}\n",
                truncate(d.province, 20),
                truncate(d.name, 18),
                d.anomaly_cm,
                d.status()
            )
            .trim_end(),
        );
        out.push('\n');
    }

    if let Some(s) = summary {
        out.push_str(&format!(
            "\nDistricts: {} | mean={:.2} cm | most depleted: {} ({:.1}) | most improved: {} ({:.1})\n",
            s.total,
            s.mean_anomaly_cm,
            s.most_depleted.name,
            s.most_depleted.anomaly_cm,
            s.most_improved.name,
            s.most_improved.anomaly_cm
        ));
        out.push_str(&format!("Critical: {} | Improving: {}\n", s.critical, s.improving));
    }
    out
}

/// Outcome of a catalog selection.
pub fn format_catalog_selection(selection: &CatalogSelection) -> String {
    let mut out = String::new();
    for (name, reason) in &selection.skipped {
        out.push_str(&format!("  (skipped {name}) {reason}\n"));
    }
    match &selection.chosen {
        Some(c) => {
            out.push_str(&format!("Selected: {} [{}] ({} images", c.name, c.dataset_id, c.image_count));
            if let (Some(first), Some(last)) = (c.first_date, c.last_date) {
                out.push_str(&format!(", {first} .. {last}"));
            }
            out.push_str(")\n");
        }
        None => out.push_str("No candidate dataset is available.\n"),
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
