//! Contract for the remote geospatial query service that produces the input CSVs.
//!
//! The engine never calls this; it only documents what an acquisition step must
//! provide. Export jobs are asynchronous on the service side, so the caller
//! submits a request and polls until it completes.

use std::thread;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Lon/lat rectangle in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    pub fn is_valid(&self) -> bool {
        [self.west, self.south, self.east, self.north].iter().all(|v| v.is_finite())
            && self.west < self.east
            && self.south < self.north
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reduction {
    /// Spatial mean over the region, one value per image.
    Mean,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRequest {
    pub dataset_id: String,
    pub region: BoundingBox,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub band: String,
    pub reduction: Reduction,
    /// Nominal pixel size in metres for the reduction.
    pub scale_m: f64,
    /// Name of the exported table.
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobHandle(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    Running,
    /// Finished; `location` is where the CSV landed.
    Completed { location: String },
    Failed { message: String },
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("invalid export request: {0}")]
    InvalidRequest(String),
    #[error("query service error: {0}")]
    Service(String),
    #[error("export job {job} failed: {message}")]
    JobFailed { job: String, message: String },
    #[error("export job {job} still not complete after {polls} polls")]
    TimedOut { job: String, polls: u32 },
}

pub trait GeoQueryService {
    fn submit_export(&mut self, request: &ExportRequest) -> Result<JobHandle, QueryError>;
    fn poll(&mut self, job: &JobHandle) -> Result<JobStatus, QueryError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_polls: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            max_polls: 120,
        }
    }
}

/// Submit `request` and block until the export completes.
///
/// Returns the output location. A failed job or exhausting `max_polls` is an
/// error; nothing is retried.
pub fn wait_for_export<S: GeoQueryService + ?Sized>(
    service: &mut S,
    request: &ExportRequest,
    policy: PollPolicy,
) -> Result<String, QueryError> {
    if !request.region.is_valid() {
        return Err(QueryError::InvalidRequest(format!("bad region {:?}", request.region)));
    }
    if request.end < request.start {
        return Err(QueryError::InvalidRequest(format!(
            "end {} precedes start {}",
            request.end, request.start
        )));
    }

    let job = service.submit_export(request)?;
    info!(job = %job.0, dataset = %request.dataset_id, "export submitted");

    for attempt in 1..=policy.max_polls {
        match service.poll(&job)? {
            JobStatus::Completed { location } => {
                info!(job = %job.0, %location, "export complete");
                return Ok(location);
            }
            JobStatus::Failed { message } => {
                return Err(QueryError::JobFailed { job: job.0, message });
            }
            status => {
                debug!(job = %job.0, attempt, ?status, "export not ready");
                if attempt < policy.max_polls {
                    thread::sleep(policy.interval);
                }
            }
        }
    }

    Err(QueryError::TimedOut {
        job: job.0,
        polls: policy.max_polls,
    })
}
