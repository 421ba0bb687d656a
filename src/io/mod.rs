//! Input/output helpers.
//!
//! - scope CSV ingest + row validation (`ingest`)
//! - region/waveform CSV exports (`export`)
//! - analysis summary JSON read/write (`summary`)

pub mod export;
pub mod ingest;
pub mod summary;

pub use export::*;
pub use ingest::*;
pub use summary::*;
