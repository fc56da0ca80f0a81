//! Reporting utilities: formatted terminal output for runs, forecasts, the
//! district table and dataset selection.

pub mod format;

pub use format::*;
