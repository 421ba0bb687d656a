//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed from acquisition into the analysis engine
//! - exported to JSON/CSV
//! - reloaded later for reporting

use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Raw acquired waveform: two equal-length sequences, time strictly increasing.
///
/// Acquisition signals "nothing acquired" with an empty waveform; shape
/// validation is left to segmentation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Waveform {
    pub time: Vec<f64>,
    pub voltage: Vec<f64>,
}

impl Waveform {
    pub fn new(time: Vec<f64>, voltage: Vec<f64>) -> Self {
        Self { time, voltage }
    }

    pub fn len(&self) -> usize {
        self.time.len().min(self.voltage.len())
    }

    /// True when either sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.time.is_empty() || self.voltage.is_empty()
    }
}

/// A `(time, voltage)` marker coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub time: f64,
    pub voltage: f64,
}

impl Point {
    pub fn new(time: f64, voltage: f64) -> Self {
        Self { time, voltage }
    }
}

/// Derivative sign of a monotonic region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Rising,
    Falling,
}

impl Direction {
    pub fn is_increasing(self) -> bool {
        self == Direction::Rising
    }

    /// `+1.0` for rising, `-1.0` for falling. Multiplying a falling window by
    /// this sign turns it into the equivalent rising one.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Rising => 1.0,
            Direction::Falling => -1.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::Rising => "rising",
            Direction::Falling => "falling",
        }
    }
}

/// Cell parameters in the units the user types them in.
///
/// The analysis engine converts these to SI exactly once, when they are handed
/// to `RegionSet`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellInputs {
    /// Drive amplitude (V).
    pub input_voltage: f64,
    /// Cell gap (µm).
    pub thickness_um: f64,
    /// Electrode area (mm²).
    pub area_mm2: f64,
    /// Series capacitance (nF).
    pub capacitance_nf: f64,
    /// Smectic tilt angle (degrees).
    pub tilt_deg: f64,
}

impl Default for CellInputs {
    fn default() -> Self {
        Self {
            input_voltage: 10.0,
            thickness_um: 3.0,
            area_mm2: 100.0,
            capacitance_nf: 30.0,
            tilt_deg: 45.0,
        }
    }
}

/// Where the analysed waveform came from.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceSpec {
    Csv { path: PathBuf, skip_rows: usize },
    Synthetic(SynthSpec),
}

/// Shape of a synthetic FLC switching waveform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SynthSpec {
    /// Number of full drive periods.
    pub periods: usize,
    /// Samples per full period.
    pub samples_per_period: usize,
    /// Drive period (s).
    pub period: f64,
    /// Capacitive step height (V).
    pub u_c: f64,
    /// Repolarization step height (V).
    pub u_p: f64,
    /// Switching time constant (s).
    pub tau: f64,
    /// Samples over which the capacitive step ramps.
    pub ramp_samples: usize,
    /// Delay of the repolarization midpoint, in units of `tau`.
    pub delay: f64,
    /// Gaussian noise standard deviation (V); zero disables noise.
    pub noise_std: f64,
    pub seed: u64,
}

impl Default for SynthSpec {
    fn default() -> Self {
        Self {
            periods: 2,
            samples_per_period: 2000,
            period: 2e-3,
            u_c: 2.0,
            u_p: 4.0,
            tau: 20e-6,
            ramp_samples: 2,
            delay: 4.0,
            noise_std: 0.0,
            seed: 42,
        }
    }
}

/// Everything `flc analyze` needs, resolved from CLI flags, environment and defaults.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub source: SourceSpec,
    pub cell: CellInputs,

    /// Optional time coordinate to inspect (`region_at`).
    pub inspect_at: Option<f64>,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_regions: Option<PathBuf>,
    pub export_summary: Option<PathBuf>,
    pub debug_bundle: bool,
}

/// Per-region results as exported/reloaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSummary {
    pub direction: Direction,
    pub start_time: f64,
    pub end_time: f64,
    pub knee: Point,
    pub t40: Point,
    pub t60: Point,
    pub u_p: f64,
    pub u_c: f64,
    pub tau_us: f64,
    pub alpha: f64,
    pub polarization: f64,
    pub viscosity: f64,
    pub anisotropy: f64,
}

/// Means over all regions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeanValues {
    pub polarization: f64,
    pub viscosity: f64,
    pub anisotropy: f64,
}

/// A saved analysis file (JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisFile {
    pub tool: String,
    pub generated_at: DateTime<Local>,
    pub source: String,
    pub samples: usize,
    pub cell: CellInputs,
    pub regions: Vec<RegionSummary>,
    pub means: Option<MeanValues>,
}
