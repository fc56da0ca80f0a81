//! `watertrace` library crate.
//!
//! The binary (`watertrace`) is a thin wrapper around this library so that:
//!
//! - the engine is testable without spawning processes
//! - modules are reusable by other tools that consume the run report
//! - code stays easy to navigate as the project grows

pub mod analysis;
pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod forecast;
pub mod io;
pub mod logging;
pub mod math;
pub mod plot;
pub mod report;
