//! Waveform acquisition.
//!
//! The analysis engine never talks to a scope or a file directly; it receives
//! a `Waveform` from a `WaveformSource`. An empty waveform means nothing was
//! acquired and leaves the current analysis untouched.

pub mod synth;

use std::path::PathBuf;

use crate::domain::{SourceSpec, SynthSpec, Waveform};
use crate::error::AppError;
use crate::io::ingest::load_waveform_csv;

/// Something that can hand over one acquired waveform.
pub trait WaveformSource {
    /// Short human-readable description (file path, generator settings, ...).
    fn describe(&self) -> String;

    fn acquire(&mut self) -> Result<Waveform, AppError>;

    /// Input rows dropped during the last `acquire`.
    fn skipped_rows(&self) -> usize {
        0
    }
}

/// Scope CSV export on disk.
#[derive(Debug, Clone)]
pub struct CsvSource {
    pub path: PathBuf,
    pub skip_rows: usize,
    /// Rows skipped because they did not parse, from the last `acquire`.
    pub skipped_rows: usize,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>, skip_rows: usize) -> Self {
        Self {
            path: path.into(),
            skip_rows,
            skipped_rows: 0,
        }
    }
}

impl WaveformSource for CsvSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn acquire(&mut self) -> Result<Waveform, AppError> {
        let ingested = load_waveform_csv(&self.path, self.skip_rows)?;
        self.skipped_rows = ingested.row_errors.len();
        Ok(ingested.waveform)
    }

    fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }
}

/// Synthetic FLC response (see `synth`).
#[derive(Debug, Clone, Copy)]
pub struct SyntheticSource {
    pub spec: SynthSpec,
}

impl WaveformSource for SyntheticSource {
    fn describe(&self) -> String {
        let s = &self.spec;
        format!(
            "synthetic ({} periods, {} samples/period, u_c={} V, u_p={} V, tau={:.1} µs, noise={} V, seed={})",
            s.periods,
            s.samples_per_period,
            s.u_c,
            s.u_p,
            s.tau * 1e6,
            s.noise_std,
            s.seed
        )
    }

    fn acquire(&mut self) -> Result<Waveform, AppError> {
        synth::generate(&self.spec)
    }
}

/// Build the source described by a `SourceSpec`.
pub fn source_for(spec: &SourceSpec) -> Box<dyn WaveformSource> {
    match spec {
        SourceSpec::Csv { path, skip_rows } => Box::new(CsvSource::new(path.clone(), *skip_rows)),
        SourceSpec::Synthetic(spec) => Box::new(SyntheticSource { spec: *spec }),
    }
}
