//! CSV ingest and validation.
//!
//! This module is responsible for turning an exported time-series CSV into a
//! validated `Series` that is safe to analyze.
//!
//! Design goals:
//! - **Explicit schema**: the caller names the date and value columns
//! - **Row-level validation** (drop bad rows, but report what happened)
//! - **Deterministic behavior** (stable sort, no hidden heuristics)
//! - **Separation of concerns**: no analysis logic here

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use tracing::{info, warn};

use crate::domain::{ColumnMapping, PointKind, Series, Source, TimePoint};
use crate::error::LoadError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: validated series + what was dropped along the way.
#[derive(Debug, Clone)]
pub struct IngestedSeries {
    pub series: Series,
    pub rows_read: usize,
    pub rows_used: usize,
    /// Points sharing a date with their predecessor (kept, not merged).
    pub duplicate_dates: usize,
    pub row_errors: Vec<RowError>,
}

impl IngestedSeries {
    pub fn rows_dropped(&self) -> usize {
        self.rows_read - self.rows_used
    }
}

/// Load a dated numeric series from `path`.
///
/// Every point is tagged with `source` and `PointKind::Measured`.
pub fn load_series(path: &Path, columns: &ColumnMapping, source: Source) -> Result<IngestedSeries, LoadError> {
    let file = File::open(path).map_err(|e| LoadError::Open {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| LoadError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?
        .clone();

    let header_map = build_header_map(&headers);
    let date_idx = resolve_column(&header_map, &columns.date_column, path)?;
    let value_idx = resolve_column(&header_map, &columns.value_column, path)?;

    let mut points = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, date_idx, value_idx, columns) {
            Ok((date, value)) => points.push(TimePoint::new(date, value, source, PointKind::Measured)),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if points.is_empty() {
        return Err(LoadError::NoValidRows {
            path: path.to_path_buf(),
            rows_read,
        });
    }

    // Stable: rows sharing a date keep their file order.
    points.sort_by_key(|p| p.date);

    let rows_used = points.len();
    if !row_errors.is_empty() {
        warn!(
            path = %path.display(),
            dropped = row_errors.len(),
            first_line = row_errors[0].line,
            "dropped rows with missing or invalid date/value"
        );
    }

    let series = Series::new(source, points)
        .map_err(|_| LoadError::NoValidRows {
            path: path.to_path_buf(),
            rows_read,
        })?;

    let duplicate_dates = series.duplicate_dates();
    if duplicate_dates > 0 {
        warn!(path = %path.display(), duplicate_dates, "series contains duplicate dates");
    }

    info!(path = %path.display(), %source, rows_read, rows_used, "loaded series");

    Ok(IngestedSeries {
        series,
        rows_read,
        rows_used,
        duplicate_dates,
        row_errors,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        // First occurrence wins for repeated header names.
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header (e.g. "﻿date"). If we don't strip it, schema validation will
    // incorrectly report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn resolve_column(header_map: &HashMap<String, usize>, name: &str, path: &Path) -> Result<usize, LoadError> {
    header_map
        .get(&normalize_header_name(name))
        .copied()
        .ok_or_else(|| LoadError::MissingColumn {
            path: path.to_path_buf(),
            column: name.to_string(),
        })
}

fn parse_row(
    record: &StringRecord,
    date_idx: usize,
    value_idx: usize,
    columns: &ColumnMapping,
) -> Result<(NaiveDate, f64), String> {
    let date_raw = get_field(record, date_idx)
        .ok_or_else(|| format!("Missing value in `{}`.", columns.date_column))?;
    let value_raw = get_field(record, value_idx)
        .ok_or_else(|| format!("Missing value in `{}`.", columns.value_column))?;

    let date = parse_date(date_raw)?;
    let value = value_raw
        .parse::<f64>()
        .map_err(|_| format!("Invalid number '{value_raw}' in `{}`.", columns.value_column))?;
    if !value.is_finite() {
        return Err(format!("Non-finite value in `{}`.", columns.value_column));
    }

    Ok((date, value))
}

fn get_field(record: &StringRecord, idx: usize) -> Option<&str> {
    record.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // Exports from the query service use ISO dates, but spreadsheets round-trip
    // them into `DD/MM/YYYY` and pandas writes full timestamps. We accept a small
    // set of formats to reduce friction while keeping parsing deterministic.
    const DATE_FMTS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y"];
    const DATETIME_FMTS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, YYYY/MM/DD, DD/MM/YYYY, DD-MM-YYYY, or an ISO timestamp."
    ))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn grace_columns() -> ColumnMapping {
        ColumnMapping::new("date", "groundwater_cm")
    }

    #[test]
    fn loads_sorts_and_tags_points() {
        let file = write_csv(
            "date,groundwater_cm,data_source\n\
             2016-01-01,-6.0,GRACE\n\
             2015-01-01,-5.0,GRACE\n\
             2017-01-01,-8.73,GRACE\n",
        );
        let ingest = load_series(file.path(), &grace_columns(), Source::Historical).unwrap();
        let dates: Vec<String> = ingest.series.points().iter().map(|p| p.date.to_string()).collect();
        assert_eq!(dates, ["2015-01-01", "2016-01-01", "2017-01-01"]);
        assert!(ingest.series.points().iter().all(|p| p.source == Source::Historical));
        assert!(ingest.series.points().iter().all(|p| p.kind == PointKind::Measured));
        assert_eq!(ingest.rows_read, 3);
        assert_eq!(ingest.rows_dropped(), 0);
    }

    #[test]
    fn drops_rows_with_missing_or_invalid_values() {
        let file = write_csv(
            "date,groundwater_cm\n\
             2015-01-01,-5.0\n\
             2015-02-01,\n\
             ,-4.0\n\
             2015-03-01,abc\n\
             2015-04-01,NaN\n\
             2015-05-01,-5.5\n",
        );
        let ingest = load_series(file.path(), &grace_columns(), Source::Historical).unwrap();
        assert_eq!(ingest.rows_read, 6);
        assert_eq!(ingest.rows_used, 2);
        assert_eq!(ingest.rows_dropped(), 4);
        let lines: Vec<usize> = ingest.row_errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, [3, 4, 5, 6]);
    }

    #[test]
    fn header_matching_ignores_case_and_bom() {
        let file = write_csv("\u{feff}Date,GroundWater_CM\n2018-01-01,200.0\n");
        let ingest = load_series(file.path(), &grace_columns(), Source::Recent).unwrap();
        assert_eq!(ingest.series.len(), 1);
    }

    #[test]
    fn missing_column_is_a_load_error() {
        let file = write_csv("date,soil_moisture\n2018-01-01,200.0\n");
        let err = load_series(file.path(), &grace_columns(), Source::Recent).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn { ref column, .. } if column == "groundwater_cm"));
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let err = load_series(Path::new("/nonexistent/grace.csv"), &grace_columns(), Source::Historical)
            .unwrap_err();
        assert!(matches!(err, LoadError::Open { .. }));
    }

    #[test]
    fn zero_valid_rows_is_a_load_error() {
        let file = write_csv("date,groundwater_cm\n2015-01-01,\nbad,1.0\n");
        let err = load_series(file.path(), &grace_columns(), Source::Historical).unwrap_err();
        assert!(matches!(err, LoadError::NoValidRows { rows_read: 2, .. }));
    }

    #[test]
    fn duplicate_dates_are_kept_and_counted() {
        let file = write_csv("date,groundwater_cm\n2018-01-01,1.0\n2018-01-01,2.0\n2018-02-01,3.0\n");
        let ingest = load_series(file.path(), &grace_columns(), Source::Recent).unwrap();
        assert_eq!(ingest.series.len(), 3);
        assert_eq!(ingest.duplicate_dates, 1);
        // File order is preserved for the tied dates.
        assert_eq!(ingest.series.points()[0].value, 1.0);
    }

    #[test]
    fn single_valid_row_loads() {
        let file = write_csv("date,groundwater_cm\n2018-01-01,1.0\n2018-02-01,\n");
        let ingest = load_series(file.path(), &grace_columns(), Source::Recent).unwrap();
        assert_eq!(ingest.series.len(), 1);
    }

    #[test]
    fn parse_date_accepts_common_formats() {
        let expected = NaiveDate::from_ymd_opt(2017, 5, 22).unwrap();
        for s in [
            "2017-05-22",
            "2017/05/22",
            "22/05/2017",
            "22-05-2017",
            "2017-05-22T00:00:00",
            "2017-05-22 12:30:00.000",
        ] {
            assert_eq!(parse_date(s).unwrap(), expected, "{s}");
        }
        assert!(parse_date("May 2017").is_err());
    }
}
