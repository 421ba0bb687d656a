//! Read/write analysis summary JSON files.
//!
//! The summary is the portable record of one analysis run: source, cell
//! parameters, per-region results and means. `flc show` renders it again
//! without the waveform. The schema is defined by `domain::AnalysisFile`.

use std::fs::File;
use std::path::Path;

use chrono::Local;

use crate::analysis::RegionSet;
use crate::domain::{AnalysisFile, CellInputs};
use crate::error::AppError;

pub const TOOL_NAME: &str = "flc";

/// Build the summary record for a loaded region set.
pub fn build_summary(set: &RegionSet, source: &str, samples: usize, cell: CellInputs) -> AnalysisFile {
    AnalysisFile {
        tool: TOOL_NAME.to_string(),
        generated_at: Local::now(),
        source: source.to_string(),
        samples,
        cell,
        regions: set.regions().iter().map(|r| r.summary()).collect(),
        means: set.means().ok(),
    }
}

/// Write an analysis summary JSON file.
pub fn write_summary_json(path: &Path, summary: &AnalysisFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create summary JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, summary)
        .map_err(|e| AppError::new(2, format!("Failed to write summary JSON: {e}")))?;
    Ok(())
}

/// Read an analysis summary JSON file.
pub fn read_summary_json(path: &Path) -> Result<AnalysisFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open summary JSON '{}': {e}", path.display())))?;
    let summary: AnalysisFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid summary JSON: {e}")))?;
    if summary.tool != TOOL_NAME {
        return Err(AppError::new(
            2,
            format!("'{}' was not written by {TOOL_NAME} (tool = '{}').", path.display(), summary.tool),
        ));
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synth::generate;
    use crate::domain::SynthSpec;

    #[test]
    fn summary_survives_json() {
        let wave = generate(&SynthSpec::default()).unwrap();
        let mut set = RegionSet::new();
        set.load_waveform(&wave.time, &wave.voltage).unwrap();

        let summary = build_summary(&set, "synthetic", wave.len(), CellInputs::default());
        assert_eq!(summary.regions.len(), set.len());
        assert!(summary.means.is_some());

        let path = std::env::temp_dir().join(format!("flc_summary_test_{}.json", std::process::id()));
        write_summary_json(&path, &summary).unwrap();
        let back = read_summary_json(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(back.tool, TOOL_NAME);
        assert_eq!(back.samples, summary.samples);
        assert_eq!(back.regions.len(), summary.regions.len());
        assert_eq!(back.regions[0].direction, summary.regions[0].direction);
    }
}
