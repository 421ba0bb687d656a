//! Response shape exponent (alpha).
//!
//! After the knee, the normalized response `u(t) = −cos φ(t)` of an ideal cell
//! obeys `τ·du/dt = 1 − u²`. Deviations are captured by alpha, solved point-wise
//! from
//!
//! ```text
//! alpha_i = (1 − u'_i·τ / (1 − u_i²)) / u_i
//! ```
//!
//! and averaged. Samples inside the 5% guard bands of the `u_p` span and samples
//! strictly between t40 and t60 are left out: the former sit where `1 − u²` and
//! the latter where `u` approach zero.

use crate::error::RegionError;
use crate::math::{gradient, mean};

/// Guard band, as a fraction of `u_p`, excluded at both ends of the response.
pub const GUARD_BAND: f64 = 0.05;

/// Inputs of the alpha estimate, in rising orientation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AlphaInput<'a> {
    pub time: &'a [f64],
    /// Oriented voltage (falling regions already sign-flipped).
    pub voltage: &'a [f64],
    pub knee: usize,
    pub min_voltage: f64,
    pub u_c: f64,
    pub u_p: f64,
    pub t40_time: f64,
    pub t60_time: f64,
    pub tau: f64,
}

/// Normalized `(t, u)` samples used by the estimate.
pub(crate) fn normalized_response(input: &AlphaInput<'_>) -> Result<(Vec<f64>, Vec<f64>), RegionError> {
    if input.u_p <= 0.0 {
        return Err(RegionError::DegenerateSpan);
    }

    let base = input.min_voltage + input.u_c;
    let low = base + input.u_p * GUARD_BAND;
    let high = base + input.u_p * (1.0 - GUARD_BAND);
    let knee_time = input.time[input.knee];
    let knee_voltage = input.voltage[input.knee];

    let mut t_norm = Vec::new();
    let mut u_norm = Vec::new();
    for (&t, &v) in input.time.iter().zip(input.voltage).skip(input.knee) {
        if v < low || v > high {
            continue;
        }
        if t > input.t40_time && t < input.t60_time {
            continue;
        }
        t_norm.push(t - knee_time);
        u_norm.push((v - knee_voltage) / (0.5 * input.u_p) - 1.0);
    }
    Ok((t_norm, u_norm))
}

/// Mean of the point-wise alpha estimates.
pub(crate) fn estimate_alpha(input: &AlphaInput<'_>) -> Result<f64, RegionError> {
    let (t_norm, u_norm) = normalized_response(input)?;
    if t_norm.len() < 2 {
        return Err(RegionError::TooFewAlphaPoints(t_norm.len()));
    }

    let du = gradient(&u_norm, &t_norm).map_err(|_| RegionError::TooFewAlphaPoints(t_norm.len()))?;

    let knee_time = input.time[input.knee];
    let mut alphas = Vec::with_capacity(u_norm.len());
    for ((&t, &u), &du) in t_norm.iter().zip(&u_norm).zip(&du) {
        let a = (1.0 - (du * input.tau) / (1.0 - u * u)) / u;
        if !a.is_finite() {
            return Err(RegionError::NonFiniteAlpha { time: t + knee_time, u });
        }
        alphas.push(a);
    }

    mean(&alphas).ok_or(RegionError::TooFewAlphaPoints(0))
}
