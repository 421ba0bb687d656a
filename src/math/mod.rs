//! Mathematical utilities: numerical differentiation and simple statistics.

pub mod gradient;
pub mod stats;

pub use gradient::*;
pub use stats::*;
