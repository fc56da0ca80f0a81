//! Harmonization & trend engine.
//!
//! Stages (after loading, see `io::ingest`):
//!
//! - trend estimation per series (`trend`)
//! - baseline normalization of the recent series (`baseline`)
//! - splicing recent anomalies onto the historical record (`splice`)
//!
//! plus descriptive statistics used by the reports (`summary`).

pub mod baseline;
pub mod splice;
pub mod summary;
pub mod trend;

pub use baseline::*;
pub use splice::*;
pub use summary::*;
pub use trend::*;
