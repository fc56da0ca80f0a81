//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - provenance-tagged observations (`TimePoint`, `Series`, `CombinedSeries`)
//! - engine outputs (`TrendResult`, `Baseline`, `SpliceCaveat`)
//! - run configuration (`PipelineConfig`)

pub mod config;
pub mod types;

pub use config::*;
pub use types::*;
