//! Error types.
//!
//! Library code returns typed errors (`LoadError`, `EngineError`). The binary
//! collapses them into `AppError`, which carries the process exit code:
//!
//! - `2`: input/configuration problems (missing file, missing column, bad flag)
//! - `3`: not enough data to compute what was asked
//! - `4`: runtime/numerical failures

use std::path::PathBuf;

use thiserror::Error;

/// Failure to turn a tabular file into a validated `Series`.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read CSV headers of '{}': {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("missing required column `{column}` in '{}'", path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("no valid rows remain in '{}' ({rows_read} read, all dropped)", path.display())]
    NoValidRows { path: PathBuf, rows_read: usize },
}

/// Errors raised by the harmonization and trend engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("insufficient data for {what}: need at least {needed} points, got {got}")]
    InsufficientData {
        what: &'static str,
        needed: usize,
        got: usize,
    },

    #[error("baseline window {year} contains no data points")]
    EmptyWindow { year: i32 },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error(
        "historical and recent date ranges overlap (last historical {last_historical}, first recent {first_recent})"
    )]
    Overlap {
        last_historical: chrono::NaiveDate,
        first_recent: chrono::NaiveDate,
    },

    #[error("invalid series: {0}")]
    InvalidSeries(String),

    #[error("least-squares solve failed: {0}")]
    Solver(String),
}

impl EngineError {
    /// Process exit code used when this error aborts the CLI.
    pub fn exit_code(&self) -> u8 {
        match self {
            EngineError::Load(LoadError::NoValidRows { .. }) => 3,
            EngineError::Load(_) => 2,
            EngineError::InsufficientData { .. } | EngineError::EmptyWindow { .. } => 3,
            EngineError::InvalidParameter(_) | EngineError::Overlap { .. } => 2,
            EngineError::InvalidSeries(_) | EngineError::Solver(_) => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl From<LoadError> for AppError {
    fn from(err: LoadError) -> Self {
        EngineError::from(err).into()
    }
}
