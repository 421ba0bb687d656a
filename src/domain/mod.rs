//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the acquired waveform and marker coordinates (`Waveform`, `Point`)
//! - region direction (`Direction`)
//! - user-facing cell parameters and run configuration (`CellInputs`, `AnalysisConfig`)
//! - exported results (`RegionSummary`, `AnalysisFile`)

pub mod types;

pub use types::*;
