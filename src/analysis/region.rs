//! One monotonic region and its switching parameters.
//!
//! Construction runs the whole extraction for the region's samples:
//!
//! - knee point: end of the capacitive leading edge, found from the derivative
//! - `u_p` / `u_c`: repolarization and capacitive voltage spans around the knee
//! - t40 / t60 markers and the time constant `tau`
//! - shape exponent `alpha` (see `analysis::alpha`)
//!
//! A falling region is handled as the sign-flipped rising one, so there is only
//! one copy of each scan.
//!
//! Physical quantities (`polarization`, `viscosity`, `anisotropy`) are computed
//! on every read from the stored spans and the current cell parameters.

use crate::analysis::alpha::{AlphaInput, estimate_alpha};
use crate::domain::{Direction, Point, RegionSummary};
use crate::error::RegionError;
use crate::math::min_max;
use crate::models::{
    CellParams, POLARIZATION_SCALE, VISCOSITY_SCALE, anisotropy, polarization, viscosity,
};

/// Fraction of the region's derivative peak that marks the leading edge.
pub const KNEE_THRESHOLD: f64 = 0.9;

/// `ln(0.6 / 0.4)`: the t40→t60 interval of a first-order response in units of tau.
pub const TAU_NORMALIZATION: f64 = 0.405465;

/// Smallest window a region can be built from.
pub const MIN_REGION_SAMPLES: usize = 3;

/// Samples of one window plus the time at which the window ends.
#[derive(Debug, Clone, Copy)]
pub struct Span<'a> {
    pub time: &'a [f64],
    pub voltage: &'a [f64],
    pub derivative: &'a [f64],
    /// Start of the following window (or the last sample time for the final window).
    pub end_time: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    direction: Direction,
    start_time: f64,
    end_time: f64,
    samples: usize,
    knee: Point,
    t40: Point,
    t60: Point,
    u_p: f64,
    u_c: f64,
    tau: f64,
    alpha: f64,
    params: CellParams,
}

impl Region {
    /// Extract knee, markers, tau and alpha from one monotonic window.
    pub fn new(span: Span<'_>, direction: Direction) -> Result<Self, RegionError> {
        let n = span.time.len();
        if n < MIN_REGION_SAMPLES || span.voltage.len() != n || span.derivative.len() != n {
            return Err(RegionError::TooShort {
                len: n.min(span.voltage.len()).min(span.derivative.len()),
                min: MIN_REGION_SAMPLES,
            });
        }

        let sign = direction.sign();
        let voltage: Vec<f64> = span.voltage.iter().map(|v| v * sign).collect();
        let derivative: Vec<f64> = span.derivative.iter().map(|d| d * sign).collect();

        let knee = find_knee(&derivative)?;
        let (min_voltage, max_voltage) = min_max(&voltage).ok_or(RegionError::TooShort {
            len: 0,
            min: MIN_REGION_SAMPLES,
        })?;
        let u_p = max_voltage - voltage[knee];
        let u_c = voltage[knee] - min_voltage;

        let t40 = find_crossing(&voltage, knee, min_voltage + u_c + u_p * 0.4)
            .ok_or(RegionError::MarkerNotFound { marker: "t40" })?;
        let t60 = find_crossing(&voltage, t40, min_voltage + u_c + u_p * 0.6)
            .ok_or(RegionError::MarkerNotFound { marker: "t60" })?;

        let tau = (span.time[t60] - span.time[t40]) / TAU_NORMALIZATION;

        let alpha = estimate_alpha(&AlphaInput {
            time: span.time,
            voltage: &voltage,
            knee,
            min_voltage,
            u_c,
            u_p,
            t40_time: span.time[t40],
            t60_time: span.time[t60],
            tau,
        })?;

        let point = |i: usize| Point::new(span.time[i], span.voltage[i]);
        Ok(Self {
            direction,
            start_time: span.time[0],
            end_time: span.end_time,
            samples: n,
            knee: point(knee),
            t40: point(t40),
            t60: point(t60),
            u_p,
            u_c,
            tau,
            alpha,
            params: CellParams::default(),
        })
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_increasing(&self) -> bool {
        self.direction.is_increasing()
    }

    /// `(start_time, end_time)` of the region's window.
    pub fn borders(&self) -> (f64, f64) {
        (self.start_time, self.end_time)
    }

    /// True when `x` lies strictly inside the window.
    pub fn contains(&self, x: f64) -> bool {
        x > self.start_time && x < self.end_time
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn knee_point(&self) -> Point {
        self.knee
    }

    pub fn t40_point(&self) -> Point {
        self.t40
    }

    pub fn t60_point(&self) -> Point {
        self.t60
    }

    /// Repolarization voltage span (V).
    pub fn u_p(&self) -> f64 {
        self.u_p
    }

    /// Capacitive voltage span (V).
    pub fn u_c(&self) -> f64 {
        self.u_c
    }

    /// Switching time constant in the input time unit.
    pub fn tau(&self) -> f64 {
        self.tau
    }

    /// Switching time constant in microseconds (input time in seconds).
    pub fn tau_us(&self) -> f64 {
        self.tau * 1e6
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn params(&self) -> &CellParams {
        &self.params
    }

    pub fn set_params(&mut self, params: CellParams) {
        self.params = params;
    }

    /// Drive amplitude (V).
    pub fn set_input_voltage(&mut self, volts: f64) {
        self.params.input_voltage = volts;
    }

    /// Cell thickness (m).
    pub fn set_thickness(&mut self, metres: f64) {
        self.params.thickness = metres;
    }

    /// Electrode area (m²).
    pub fn set_area(&mut self, square_metres: f64) {
        self.params.area = square_metres;
    }

    /// Series capacitance (F).
    pub fn set_capacitance(&mut self, farads: f64) {
        self.params.capacitance = farads;
    }

    /// Tilt angle (rad).
    pub fn set_tilt_angle(&mut self, radians: f64) {
        self.params.tilt_angle = radians;
    }

    /// Spontaneous polarization (nC/cm²).
    pub fn polarization(&self) -> f64 {
        self.raw_polarization() * POLARIZATION_SCALE
    }

    /// Rotational viscosity.
    pub fn viscosity(&self) -> f64 {
        viscosity(self.tau, self.raw_polarization(), &self.params) * VISCOSITY_SCALE
    }

    /// Dielectric anisotropy.
    pub fn anisotropy(&self) -> f64 {
        anisotropy(self.alpha, self.raw_polarization(), &self.params)
    }

    fn raw_polarization(&self) -> f64 {
        polarization(self.u_p, &self.params)
    }

    pub fn summary(&self) -> RegionSummary {
        RegionSummary {
            direction: self.direction,
            start_time: self.start_time,
            end_time: self.end_time,
            knee: self.knee,
            t40: self.t40,
            t60: self.t60,
            u_p: self.u_p,
            u_c: self.u_c,
            tau_us: self.tau_us(),
            alpha: self.alpha,
            polarization: self.polarization(),
            viscosity: self.viscosity(),
            anisotropy: self.anisotropy(),
        }
    }
}

/// Knee index on a rising-oriented derivative.
///
/// Enter the leading edge at the first sample above `KNEE_THRESHOLD · peak`,
/// follow it up to its top, then take the first local minimum after it. When
/// the derivative never turns upward again, fall back to the first sample where
/// it stops strictly decreasing.
fn find_knee(derivative: &[f64]) -> Result<usize, RegionError> {
    let n = derivative.len();
    let (_, peak) = min_max(derivative).ok_or(RegionError::KneeNotFound)?;
    let threshold = peak * KNEE_THRESHOLD;

    let entry = derivative
        .iter()
        .position(|&d| d > threshold)
        .ok_or(RegionError::KneeNotFound)?;

    let mut top = entry;
    for i in entry + 1..n {
        if derivative[i] > derivative[i - 1] {
            top = i;
        }
        if derivative[i] < threshold {
            break;
        }
    }

    (top..n - 1)
        .find(|&i| derivative[i + 1] > derivative[i])
        .or_else(|| (top..n - 1).find(|&i| derivative[i + 1] >= derivative[i]))
        .ok_or(RegionError::KneeNotFound)
}

/// First index at or after `from` whose voltage reaches `threshold`.
fn find_crossing(voltage: &[f64], from: usize, threshold: f64) -> Option<usize> {
    (from..voltage.len()).find(|&i| voltage[i] >= threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::gradient;

    fn ramp_window(direction: Direction) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        // Samples 10..80 of a 0→10 ramp over 10..20 (or its mirror).
        let time: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let voltage: Vec<f64> = (0..100)
            .map(|i| {
                let v = ((i as f64) - 10.0).clamp(0.0, 10.0);
                match direction {
                    Direction::Rising => v,
                    Direction::Falling => 10.0 - v,
                }
            })
            .collect();
        let derivative = gradient(&voltage, &time).unwrap();
        (time[10..80].to_vec(), voltage[10..80].to_vec(), derivative[10..80].to_vec())
    }

    #[test]
    fn linear_ramp_knee_and_markers() {
        let (t, v, d) = ramp_window(Direction::Rising);
        let r = Region::new(
            Span {
                time: &t,
                voltage: &v,
                derivative: &d,
                end_time: 80.0,
            },
            Direction::Rising,
        )
        .unwrap();

        assert_eq!(r.knee_point(), Point::new(11.0, 1.0));
        assert!((r.u_p() - 9.0).abs() < 1e-12);
        assert!((r.u_c() - 1.0).abs() < 1e-12);
        assert_eq!(r.t40_point(), Point::new(15.0, 5.0));
        assert_eq!(r.t60_point(), Point::new(17.0, 7.0));
        assert!((r.tau() - 2.0 / TAU_NORMALIZATION).abs() < 1e-12);
        assert!(r.alpha().is_finite());
        assert_eq!(r.borders(), (10.0, 80.0));
        assert_eq!(r.samples(), 70);
    }

    #[test]
    fn falling_ramp_mirrors_rising() {
        let (t, v, d) = ramp_window(Direction::Falling);
        let r = Region::new(
            Span {
                time: &t,
                voltage: &v,
                derivative: &d,
                end_time: 80.0,
            },
            Direction::Falling,
        )
        .unwrap();

        assert!(!r.is_increasing());
        assert_eq!(r.knee_point(), Point::new(11.0, 9.0));
        assert_eq!(r.t40_point(), Point::new(15.0, 5.0));
        assert_eq!(r.t60_point(), Point::new(17.0, 3.0));
        assert!((r.u_p() - 9.0).abs() < 1e-12);
        assert!((r.u_c() - 1.0).abs() < 1e-12);

        let (t2, v2, d2) = ramp_window(Direction::Rising);
        let rising = Region::new(
            Span {
                time: &t2,
                voltage: &v2,
                derivative: &d2,
                end_time: 80.0,
            },
            Direction::Rising,
        )
        .unwrap();
        assert_eq!(r.tau(), rising.tau());
        assert_eq!(r.alpha(), rising.alpha());
    }

    #[test]
    fn overshoot_before_the_knee_has_no_t40() {
        // Peak at t=2, knee at t=3 (15 V); t40 needs 15 + 0.4·5 = 17 V afterwards.
        let t: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let v = [0.0, 10.0, 20.0, 15.0, 12.0, 11.5, 11.4, 11.3, 11.2, 11.1];
        let d = gradient(&v, &t).unwrap();
        let r = Region::new(
            Span {
                time: &t,
                voltage: &v,
                derivative: &d,
                end_time: 9.0,
            },
            Direction::Rising,
        );
        assert_eq!(r, Err(RegionError::MarkerNotFound { marker: "t40" }));

        // Same shape mirrored.
        let neg: Vec<f64> = v.iter().map(|x| -x).collect();
        let dn: Vec<f64> = d.iter().map(|x| -x).collect();
        let r = Region::new(
            Span {
                time: &t,
                voltage: &neg,
                derivative: &dn,
                end_time: 9.0,
            },
            Direction::Falling,
        );
        assert_eq!(r, Err(RegionError::MarkerNotFound { marker: "t40" }));
    }

    #[test]
    fn knee_prefers_a_true_local_minimum() {
        // Leading-edge spike, dip, repolarization bump, decay.
        let d = [0.2, 5.0, 10.0, 4.0, 1.0, 0.5, 2.0, 3.0, 1.0, 0.2];
        assert_eq!(find_knee(&d), Ok(5));
    }

    #[test]
    fn knee_requires_a_rising_edge() {
        let d = [-1.0, -2.0, -1.0];
        assert_eq!(find_knee(&d), Err(RegionError::KneeNotFound));
    }

    #[test]
    fn strictly_decreasing_derivative_has_no_knee() {
        let d = [10.0, 8.0, 6.0, 4.0];
        assert_eq!(find_knee(&d), Err(RegionError::KneeNotFound));
    }

    #[test]
    fn too_short_window_is_rejected() {
        let r = Region::new(
            Span {
                time: &[0.0, 1.0],
                voltage: &[0.0, 1.0],
                derivative: &[1.0, 1.0],
                end_time: 1.0,
            },
            Direction::Rising,
        );
        assert_eq!(r, Err(RegionError::TooShort { len: 2, min: 3 }));
    }

    #[test]
    fn derived_quantities_follow_parameter_updates() {
        let (t, v, d) = ramp_window(Direction::Rising);
        let mut r = Region::new(
            Span {
                time: &t,
                voltage: &v,
                derivative: &d,
                end_time: 80.0,
            },
            Direction::Rising,
        )
        .unwrap();

        let ps = r.polarization();
        r.set_capacitance(60e-9);
        assert!((r.polarization() - 2.0 * ps).abs() < 1e-9 * ps);

        let rv = r.viscosity();
        r.set_thickness(6e-6);
        assert!((r.viscosity() - 0.5 * rv).abs() < 1e-9 * rv.abs());

        r.set_input_voltage(20.0);
        let da = r.anisotropy();
        r.set_tilt_angle(std::f64::consts::FRAC_PI_2);
        // sin²(45°) = 0.5 → sin²(90°) = 1 halves the anisotropy.
        assert!((r.anisotropy() - 0.5 * da).abs() < 1e-9 * da.abs());
    }
}
