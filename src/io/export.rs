//! Export the combined series to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets, the dashboard's
//! data converter, or downstream scripts: one row per point, flat columns.

use std::fs::File;
use std::path::Path;

use crate::domain::CombinedSeries;
use crate::error::AppError;

/// Write `date,value,source,kind` rows for every combined point.
pub fn write_combined_csv(path: &Path, combined: &CombinedSeries) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_combined(file, combined)
}

pub(crate) fn write_combined<W: std::io::Write>(out: W, combined: &CombinedSeries) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);
    for p in combined.points() {
        writer
            .serialize(p)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}
