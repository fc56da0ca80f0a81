//! Candidate datasets and availability-based selection.
//!
//! Upstream archives come and go (versions get deprecated, collections are
//! renamed), so each role has an ordered list of candidates and the first one
//! that actually has imagery wins. Selection is a pure function over metadata
//! the caller already gathered; nothing here talks to a remote service.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::Source;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetCandidate {
    pub name: String,
    pub dataset_id: String,
    pub role: Source,
    /// Images found over the study area; `0` means the probe came back empty.
    pub image_count: usize,
    #[serde(default)]
    pub first_date: Option<NaiveDate>,
    #[serde(default)]
    pub last_date: Option<NaiveDate>,
}

impl DatasetCandidate {
    pub fn is_available(&self) -> bool {
        self.image_count > 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogSelection {
    pub chosen: Option<DatasetCandidate>,
    /// Candidates passed over before the choice, with the reason.
    pub skipped: Vec<(String, String)>,
}

/// First candidate (in slice order) that is available and `feasible`.
pub fn select_best<F>(candidates: &[DatasetCandidate], mut feasible: F) -> CatalogSelection
where
    F: FnMut(&DatasetCandidate) -> bool,
{
    let mut skipped = Vec::new();
    for candidate in candidates {
        if !candidate.is_available() {
            debug!(dataset = %candidate.dataset_id, "no images; skipping");
            skipped.push((candidate.name.clone(), "no images over the study area".to_string()));
            continue;
        }
        if !feasible(candidate) {
            debug!(dataset = %candidate.dataset_id, "rejected by caller");
            skipped.push((candidate.name.clone(), "rejected by selection criteria".to_string()));
            continue;
        }
        info!(dataset = %candidate.dataset_id, images = candidate.image_count, "selected dataset");
        return CatalogSelection {
            chosen: Some(candidate.clone()),
            skipped,
        };
    }
    CatalogSelection { chosen: None, skipped }
}

/// Read a JSON array of candidates.
pub fn read_candidates(path: &Path) -> Result<Vec<DatasetCandidate>, AppError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| AppError::new(2, format!("Failed to read catalog '{}': {e}", path.display())))?;
    serde_json::from_str(&text)
        .map_err(|e| AppError::new(2, format!("Invalid catalog JSON '{}': {e}", path.display())))
}
