//! Upstream data: dataset catalog selection, the export-service contract, and
//! the district lookup table.

pub mod catalog;
pub mod districts;
pub mod geo;

pub use catalog::*;
pub use districts::*;
pub use geo::*;
