//! Shared analysis pipeline.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! acquire -> segment -> build regions -> (debug bundle) -> summary
//!
//! The command handlers can then focus on presentation and exports.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::analysis::{RegionSet, Segmentation, segment};
use crate::data::source_for;
use crate::debug::{DebugContext, write_debug_bundle};
use crate::domain::{AnalysisConfig, AnalysisFile, Waveform};
use crate::error::AppError;
use crate::io::summary::build_summary;

/// All computed outputs of a single `flc analyze` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub source: String,
    pub waveform: Waveform,
    pub skipped_rows: usize,
    pub segmentation: Segmentation,
    pub set: RegionSet,
    pub summary: AnalysisFile,
    pub debug_path: Option<PathBuf>,
}

/// Execute the full analysis pipeline and return the computed outputs.
pub fn run_analysis(config: &AnalysisConfig) -> Result<RunOutput, AppError> {
    // 1) Acquire.
    let mut source = source_for(&config.source);
    let description = source.describe();
    let waveform = source.acquire()?;
    if waveform.is_empty() {
        return Err(AppError::new(3, format!("No samples acquired from {description}.")));
    }
    info!(source = %description, samples = waveform.len(), "waveform acquired");

    // 2) Segment.
    let segmentation = segment(&waveform.time, &waveform.voltage)?;

    // 3) Build regions with the configured cell parameters.
    let mut set = RegionSet::with_inputs(&config.cell);
    let loaded = set.load_segmentation(&waveform.time, &waveform.voltage, &segmentation);

    // 4) Debug bundle, written before a load failure is propagated.
    let debug_path = if config.debug_bundle {
        let ctx = DebugContext {
            source: &description,
            time: &waveform.time,
            segmentation: &segmentation,
            set: &set,
            failure: loaded.as_ref().err().map(ToString::to_string),
        };
        match write_debug_bundle(&ctx) {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(error = %e, "debug bundle not written");
                None
            }
        }
    } else {
        None
    };
    loaded?;

    // 5) Summary record shared by the report, the JSON export and `flc show`.
    let summary = build_summary(&set, &description, waveform.len(), config.cell);

    Ok(RunOutput {
        source: description,
        skipped_rows: source.skipped_rows(),
        waveform,
        segmentation,
        set,
        summary,
        debug_path,
    })
}
