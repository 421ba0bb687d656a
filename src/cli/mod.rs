//! Command-line parsing for the FLC switching analyzer.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the analysis code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::CellOverrides;
use crate::domain::SynthSpec;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "flc", version, about = "FLC switching-current waveform analyzer")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Segment a waveform, extract per-region parameters, print tables and optionally plot/export.
    Analyze(AnalyzeArgs),
    /// Generate a synthetic switching waveform and write it as CSV.
    Synth(SynthCmdArgs),
    /// Print a previously exported analysis summary JSON.
    Show(ShowArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct AnalyzeArgs {
    /// Scope CSV export (time, voltage).
    #[arg(value_name = "CSV", conflicts_with_all = ["input", "synth"])]
    pub file: Option<PathBuf>,

    /// Scope CSV export (same as the positional argument).
    #[arg(short = 'i', long, value_name = "CSV", conflicts_with = "synth")]
    pub input: Option<PathBuf>,

    /// Leading CSV rows to skip (scope preamble).
    #[arg(long, default_value_t = 0)]
    pub skip_rows: usize,

    /// Analyze a synthetic waveform instead of a file.
    #[arg(long)]
    pub synth: bool,

    #[command(flatten)]
    pub synth_shape: SynthArgs,

    #[command(flatten)]
    pub cell: CellArgs,

    /// Print the region containing this time (s).
    #[arg(long, value_name = "SECONDS", allow_negative_numbers = true)]
    pub at: Option<f64>,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export per-region results to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the analysis summary to JSON (readable by `flc show`).
    #[arg(long = "export-summary")]
    pub export_summary: Option<PathBuf>,

    /// Write a segmentation debug bundle to `debug/`.
    #[arg(long)]
    pub debug: bool,
}

/// Cell parameters; unset flags fall back to `FLC_*` environment values, then defaults.
#[derive(Debug, Args, Clone, Default)]
pub struct CellArgs {
    /// Drive amplitude (V).
    #[arg(long = "voltage", value_name = "V")]
    pub input_voltage: Option<f64>,

    /// Cell gap (µm).
    #[arg(long = "thickness", value_name = "UM")]
    pub thickness_um: Option<f64>,

    /// Electrode area (mm²).
    #[arg(long = "area", value_name = "MM2")]
    pub area_mm2: Option<f64>,

    /// Series capacitance (nF).
    #[arg(long = "capacitance", value_name = "NF")]
    pub capacitance_nf: Option<f64>,

    /// Smectic tilt angle (degrees).
    #[arg(long = "tilt", value_name = "DEG")]
    pub tilt_deg: Option<f64>,
}

impl CellArgs {
    pub fn overrides(&self) -> CellOverrides {
        CellOverrides {
            input_voltage: self.input_voltage,
            thickness_um: self.thickness_um,
            area_mm2: self.area_mm2,
            capacitance_nf: self.capacitance_nf,
            tilt_deg: self.tilt_deg,
        }
    }
}

/// Shape of the synthetic waveform.
#[derive(Debug, Args, Clone)]
pub struct SynthArgs {
    /// Drive periods.
    #[arg(long, default_value_t = 2)]
    pub periods: usize,

    /// Samples per drive period.
    #[arg(long, default_value_t = 2000)]
    pub samples_per_period: usize,

    /// Drive period (s).
    #[arg(long, default_value_t = 2e-3)]
    pub period: f64,

    /// Capacitive step height (V).
    #[arg(long, default_value_t = 2.0)]
    pub u_c: f64,

    /// Repolarization step height (V).
    #[arg(long, default_value_t = 4.0)]
    pub u_p: f64,

    /// Switching time constant (µs).
    #[arg(long, default_value_t = 20.0)]
    pub tau_us: f64,

    /// Samples over which the capacitive step ramps.
    #[arg(long, default_value_t = 2)]
    pub ramp_samples: usize,

    /// Repolarization midpoint delay, in units of tau.
    #[arg(long, default_value_t = 4.0)]
    pub delay: f64,

    /// Gaussian noise standard deviation (V).
    #[arg(long, default_value_t = 0.0)]
    pub noise: f64,

    /// Random seed for the noise.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

impl SynthArgs {
    pub fn to_spec(&self) -> SynthSpec {
        SynthSpec {
            periods: self.periods,
            samples_per_period: self.samples_per_period,
            period: self.period,
            u_c: self.u_c,
            u_p: self.u_p,
            tau: self.tau_us * 1e-6,
            ramp_samples: self.ramp_samples,
            delay: self.delay,
            noise_std: self.noise,
            seed: self.seed,
        }
    }
}

#[derive(Debug, Parser, Clone)]
pub struct SynthCmdArgs {
    #[command(flatten)]
    pub shape: SynthArgs,

    /// Output CSV path.
    #[arg(short = 'o', long, value_name = "CSV")]
    pub output: PathBuf,
}

#[derive(Debug, Parser, Clone)]
pub struct ShowArgs {
    /// Summary JSON produced by `flc analyze --export-summary`.
    #[arg(value_name = "JSON")]
    pub summary: PathBuf,
}
