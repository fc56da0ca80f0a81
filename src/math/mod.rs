//! Mathematical utilities: simple regression, least squares, descriptive stats.

pub mod linregress;
pub mod ols;
pub mod stats;

pub use linregress::*;
pub use ols::*;
