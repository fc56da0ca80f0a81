//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - combined series CSV export (`export`)
//! - run report JSON read/write (`report`)

pub mod export;
pub mod ingest;
pub mod report;

pub use export::*;
pub use ingest::*;
pub use report::*;
