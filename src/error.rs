//! Error types.
//!
//! The analysis engine reports typed errors (`SegmentError`, `RegionError`, ...)
//! so callers can tell a flat waveform from a degenerate alpha fit. At the
//! application boundary everything collapses into `AppError`, which carries the
//! process exit code:
//!
//! - `2`: bad input, configuration or I/O
//! - `3`: no usable data
//! - `4`: computation failure

use thiserror::Error;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Numerical gradient input errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GradientError {
    #[error("gradient needs values and coordinates of equal length ({values} vs {coords})")]
    LengthMismatch { values: usize, coords: usize },
    #[error("gradient needs at least 2 samples, got {0}")]
    TooShort(usize),
    #[error("gradient coordinates must be strictly increasing (index {0})")]
    NonIncreasing(usize),
}

/// Whole-waveform segmentation failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SegmentError {
    #[error("time and voltage lengths differ ({time} vs {voltage})")]
    LengthMismatch { time: usize, voltage: usize },
    #[error("waveform needs at least {min} samples, got {len}")]
    TooShort { len: usize, min: usize },
    #[error("non-finite sample at index {0}")]
    NonFinite(usize),
    #[error("time must be strictly increasing (index {0})")]
    NonIncreasingTime(usize),
    #[error("no transitions detected: derivative never leaves the threshold band")]
    NoTransitions,
}

/// Per-region extraction failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegionError {
    #[error("region needs at least {min} samples, got {len}")]
    TooShort { len: usize, min: usize },
    #[error("knee point not found: derivative has no leading-edge peak")]
    KneeNotFound,
    #[error("{marker} marker not found after the knee point")]
    MarkerNotFound { marker: &'static str },
    #[error("repolarization span u_p is zero; response cannot be normalized")]
    DegenerateSpan,
    #[error("alpha estimation needs at least 2 retained samples, got {0}")]
    TooFewAlphaPoints(usize),
    #[error("alpha is not finite at t={time} (normalized voltage {u})")]
    NonFiniteAlpha { time: f64, u: f64 },
}

/// Failure of `RegionSet::load_waveform`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    #[error("segmentation failed: {0}")]
    Segment(#[from] SegmentError),
    #[error("region #{index} failed: {source}")]
    Region {
        index: usize,
        #[source]
        source: RegionError,
    },
    #[error("segmentation covers {segmented} samples but the waveform has {samples}")]
    SegmentationMismatch { samples: usize, segmented: usize },
}

/// Failure of an aggregate query on the region set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("no regions loaded")]
    NoRegions,
}

impl From<SegmentError> for AppError {
    fn from(value: SegmentError) -> Self {
        let code = match value {
            SegmentError::NoTransitions | SegmentError::TooShort { .. } => 3,
            _ => 2,
        };
        AppError::new(code, format!("Waveform rejected: {value}"))
    }
}

impl From<LoadError> for AppError {
    fn from(value: LoadError) -> Self {
        match value {
            LoadError::Segment(e) => e.into(),
            LoadError::Region { .. } => AppError::new(4, format!("Analysis failed: {value}")),
            LoadError::SegmentationMismatch { .. } => AppError::new(2, format!("Waveform rejected: {value}")),
        }
    }
}

impl From<QueryError> for AppError {
    fn from(value: QueryError) -> Self {
        AppError::new(4, format!("Aggregate unavailable: {value}"))
    }
}
