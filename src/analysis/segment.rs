//! Derivative-threshold segmentation of a full waveform.
//!
//! A square-wave-driven cell produces one sharp derivative spike per drive edge.
//! Segmentation turns those spikes into monotonic windows:
//!
//! 1. `dV/dt` over the whole waveform (`math::gradient`)
//! 2. extrema: samples beyond 80% of the global derivative peak, one per spike
//! 3. borders: walk back from each extremum to where the derivative changes sign
//! 4. windows: contiguous half-open spans between borders of alternating direction
//!
//! Everything here is index arithmetic over the derivative; all walks are bounded
//! so adversarial inputs produce a `SegmentError` instead of an out-of-range index.

use tracing::debug;

use crate::domain::Direction;
use crate::error::{GradientError, SegmentError};
use crate::math::{gradient, min_max};

/// Fraction of the global derivative peak a sample must exceed to count as a transient.
pub const EXTREMUM_THRESHOLD: f64 = 0.8;

/// Smallest waveform the segmenter accepts.
pub const MIN_SAMPLES: usize = 3;

/// Index of a derivative spike and its polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extremum {
    pub index: usize,
    pub direction: Direction,
}

/// First sample of a monotonic run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Border {
    pub index: usize,
    pub direction: Direction,
}

/// Half-open sample span `[start, end)` with a uniform direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: usize,
    pub end: usize,
    pub direction: Direction,
}

impl Window {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Result of segmenting one waveform.
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    pub derivative: Vec<f64>,
    pub max_threshold: f64,
    pub min_threshold: f64,
    pub extrema: Vec<Extremum>,
    pub borders: Vec<Border>,
    pub windows: Vec<Window>,
}

/// Segment `(time, voltage)` into monotonic windows.
pub fn segment(time: &[f64], voltage: &[f64]) -> Result<Segmentation, SegmentError> {
    validate(time, voltage)?;

    let derivative = gradient(voltage, time).map_err(|e| match e {
        GradientError::NonIncreasing(i) => SegmentError::NonIncreasingTime(i),
        GradientError::TooShort(len) => SegmentError::TooShort {
            len,
            min: MIN_SAMPLES,
        },
        GradientError::LengthMismatch { values, coords } => SegmentError::LengthMismatch {
            time: coords,
            voltage: values,
        },
    })?;

    let (min_fall, max_rise) = min_max(&derivative).ok_or(SegmentError::TooShort {
        len: 0,
        min: MIN_SAMPLES,
    })?;
    let max_threshold = max_rise * EXTREMUM_THRESHOLD;
    let min_threshold = min_fall * EXTREMUM_THRESHOLD;

    let extrema = find_extrema(&derivative, max_threshold, min_threshold);
    if extrema.is_empty() {
        return Err(SegmentError::NoTransitions);
    }

    let borders = find_borders(&derivative, &extrema);
    let windows = build_windows(&borders, derivative.len());

    debug!(
        max_threshold,
        min_threshold,
        extrema = extrema.len(),
        borders = borders.len(),
        windows = windows.len(),
        "segmented waveform"
    );

    Ok(Segmentation {
        derivative,
        max_threshold,
        min_threshold,
        extrema,
        borders,
        windows,
    })
}

fn validate(time: &[f64], voltage: &[f64]) -> Result<(), SegmentError> {
    if time.len() != voltage.len() {
        return Err(SegmentError::LengthMismatch {
            time: time.len(),
            voltage: voltage.len(),
        });
    }
    if time.len() < MIN_SAMPLES {
        return Err(SegmentError::TooShort {
            len: time.len(),
            min: MIN_SAMPLES,
        });
    }
    if let Some(i) = (0..time.len()).find(|&i| !time[i].is_finite() || !voltage[i].is_finite()) {
        return Err(SegmentError::NonFinite(i));
    }
    if let Some(i) = (1..time.len()).find(|&i| time[i] <= time[i - 1]) {
        return Err(SegmentError::NonIncreasingTime(i));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Idle,
    TrackingRise(usize),
    TrackingFall(usize),
}

/// Extremum detector fed one derivative sample at a time.
///
/// While the derivative stays beyond a threshold the candidate index follows
/// every sample that is more extreme than its predecessor; the candidate is
/// emitted once the derivative leaves that band.
#[derive(Debug, Clone)]
struct ExtremumScanner {
    max_threshold: f64,
    min_threshold: f64,
    state: ScanState,
}

impl ExtremumScanner {
    fn new(max_threshold: f64, min_threshold: f64) -> Self {
        Self {
            max_threshold,
            min_threshold,
            state: ScanState::Idle,
        }
    }

    /// Advance by one sample; `prev` is `None` for the first sample.
    fn step(&mut self, index: usize, value: f64, prev: Option<f64>) -> Option<Extremum> {
        if value > self.max_threshold {
            let ascending = prev.is_none_or(|p| value > p);
            let (next, emitted) = match self.state {
                ScanState::TrackingRise(c) => (ScanState::TrackingRise(if ascending { index } else { c }), None),
                ScanState::TrackingFall(c) => (
                    ScanState::TrackingRise(index),
                    Some(Extremum {
                        index: c,
                        direction: Direction::Falling,
                    }),
                ),
                ScanState::Idle if ascending => (ScanState::TrackingRise(index), None),
                ScanState::Idle => (ScanState::Idle, None),
            };
            self.state = next;
            emitted
        } else if value < self.min_threshold {
            let descending = prev.is_none_or(|p| value < p);
            let (next, emitted) = match self.state {
                ScanState::TrackingFall(c) => (ScanState::TrackingFall(if descending { index } else { c }), None),
                ScanState::TrackingRise(c) => (
                    ScanState::TrackingFall(index),
                    Some(Extremum {
                        index: c,
                        direction: Direction::Rising,
                    }),
                ),
                ScanState::Idle if descending => (ScanState::TrackingFall(index), None),
                ScanState::Idle => (ScanState::Idle, None),
            };
            self.state = next;
            emitted
        } else {
            let emitted = match self.state {
                ScanState::Idle => None,
                ScanState::TrackingRise(c) => Some(Extremum {
                    index: c,
                    direction: Direction::Rising,
                }),
                ScanState::TrackingFall(c) => Some(Extremum {
                    index: c,
                    direction: Direction::Falling,
                }),
            };
            self.state = ScanState::Idle;
            emitted
        }
    }
}

/// Extrema in ascending index order. A spike still in progress at the last
/// sample is not reported.
fn find_extrema(derivative: &[f64], max_threshold: f64, min_threshold: f64) -> Vec<Extremum> {
    let mut scanner = ExtremumScanner::new(max_threshold, min_threshold);
    let mut out = Vec::new();
    for (i, &value) in derivative.iter().enumerate() {
        let prev = i.checked_sub(1).map(|j| derivative[j]);
        if let Some(ext) = scanner.step(i, value, prev) {
            out.push(ext);
        }
    }
    out
}

/// Walk back from each extremum while the preceding sample keeps its sign.
/// The walk stops at index 0.
fn find_borders(derivative: &[f64], extrema: &[Extremum]) -> Vec<Border> {
    let mut borders: Vec<Border> = extrema
        .iter()
        .map(|ext| {
            let same_sign = |v: f64| match ext.direction {
                Direction::Rising => v > 0.0,
                Direction::Falling => v < 0.0,
            };
            let mut j = ext.index;
            while j > 0 && same_sign(derivative[j - 1]) {
                j -= 1;
            }
            Border {
                index: j,
                direction: ext.direction,
            }
        })
        .collect();

    borders.sort_by_key(|b| b.index);
    borders.dedup_by_key(|b| b.index);
    borders
}

/// Close a window at every border that flips direction; the last window runs
/// to the end of the waveform.
fn build_windows(borders: &[Border], len: usize) -> Vec<Window> {
    let mut windows = Vec::with_capacity(borders.len());
    let mut open: Option<(usize, Direction)> = None;

    for border in borders {
        match open {
            None => open = Some((border.index, border.direction)),
            // A second border in the same direction extends the open window.
            Some((_, dir)) if dir == border.direction => {}
            Some((start, dir)) => {
                windows.push(Window {
                    start,
                    end: border.index,
                    direction: dir,
                });
                open = Some((border.index, border.direction));
            }
        }
    }

    if let Some((start, direction)) = open {
        if start < len {
            windows.push(Window {
                start,
                end: len,
                direction,
            });
        }
    }
    windows
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Rise over samples 10..20, hold, fall over 80..90.
    fn trapezoid() -> (Vec<f64>, Vec<f64>) {
        let time: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let voltage = (0..100)
            .map(|i| match i {
                0..=10 => 0.0,
                11..=20 => (i - 10) as f64,
                21..=80 => 10.0,
                81..=90 => (90 - i) as f64,
                _ => 0.0,
            })
            .collect();
        (time, voltage)
    }

    #[test]
    fn trapezoid_splits_into_two_windows() {
        let (t, v) = trapezoid();
        let seg = segment(&t, &v).unwrap();

        assert_eq!(
            seg.extrema,
            vec![
                Extremum {
                    index: 11,
                    direction: Direction::Rising
                },
                Extremum {
                    index: 81,
                    direction: Direction::Falling
                },
            ]
        );
        assert_eq!(seg.borders.iter().map(|b| b.index).collect::<Vec<_>>(), vec![10, 80]);
        assert_eq!(
            seg.windows,
            vec![
                Window {
                    start: 10,
                    end: 80,
                    direction: Direction::Rising
                },
                Window {
                    start: 80,
                    end: 100,
                    direction: Direction::Falling
                },
            ]
        );
    }

    #[test]
    fn flat_signal_has_no_transitions() {
        let t: Vec<f64> = (0..50).map(|i| i as f64).collect();
        let v = vec![1.5; 50];
        assert_eq!(segment(&t, &v), Err(SegmentError::NoTransitions));
    }

    #[test]
    fn rejects_malformed_waveforms() {
        assert_eq!(
            segment(&[0.0, 1.0], &[0.0, 1.0]),
            Err(SegmentError::TooShort { len: 2, min: 3 })
        );
        assert_eq!(
            segment(&[0.0, 1.0, 2.0], &[0.0, 1.0]),
            Err(SegmentError::LengthMismatch { time: 3, voltage: 2 })
        );
        assert_eq!(
            segment(&[0.0, 2.0, 1.0], &[0.0, 1.0, 0.0]),
            Err(SegmentError::NonIncreasingTime(2))
        );
        assert_eq!(
            segment(&[0.0, 1.0, 2.0], &[0.0, f64::NAN, 0.0]),
            Err(SegmentError::NonFinite(1))
        );
    }

    #[test]
    fn border_walk_stops_at_first_sample() {
        // Derivative positive from the very first sample.
        let t: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let v = vec![0.0, 5.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0];
        let seg = segment(&t, &v).unwrap();
        assert_eq!(seg.borders[0].index, 0);
        assert_eq!(seg.windows[0].start, 0);
        assert_eq!(seg.windows[0].end, 10);
    }

    #[test]
    fn spike_in_progress_at_end_is_dropped() {
        let t: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let mut v = vec![0.0; 20];
        // Complete rise around 5, then an unfinished fall at the very end.
        v[5] = 4.0;
        for x in v.iter_mut().skip(6) {
            *x = 8.0;
        }
        v[19] = 0.0;
        let seg = segment(&t, &v).unwrap();
        assert!(seg.extrema.iter().all(|e| e.direction == Direction::Rising));
    }

    #[test]
    fn same_direction_borders_extend_the_window() {
        let borders = [
            Border {
                index: 2,
                direction: Direction::Rising,
            },
            Border {
                index: 6,
                direction: Direction::Rising,
            },
            Border {
                index: 9,
                direction: Direction::Falling,
            },
        ];
        let windows = build_windows(&borders, 12);
        assert_eq!(
            windows,
            vec![
                Window {
                    start: 2,
                    end: 9,
                    direction: Direction::Rising
                },
                Window {
                    start: 9,
                    end: 12,
                    direction: Direction::Falling
                },
            ]
        );
    }

    #[test]
    fn scanner_emits_on_direct_polarity_flip() {
        let mut s = ExtremumScanner::new(1.0, -1.0);
        assert_eq!(s.step(0, 0.0, None), None);
        assert_eq!(s.step(1, 2.0, Some(0.0)), None);
        assert_eq!(
            s.step(2, -2.0, Some(2.0)),
            Some(Extremum {
                index: 1,
                direction: Direction::Rising
            })
        );
        assert_eq!(
            s.step(3, 0.0, Some(-2.0)),
            Some(Extremum {
                index: 2,
                direction: Direction::Falling
            })
        );
    }
}
