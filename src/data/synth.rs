//! Synthetic FLC switching waveforms.
//!
//! Each drive edge contributes two steps to the measured voltage:
//!
//! - a fast capacitive step of height `u_c`, ramped over a few samples
//! - a repolarization step of height `u_p` following `(1 + tanh(t/τ − x0)) / 2`,
//!   the `−cos φ(t)` solution of the first-order switching equation, shifted and
//!   rescaled so it starts at zero and settles at exactly `u_p`
//!
//! Edges alternate in sign, the first one a quarter period in. Optional Gaussian
//! noise is drawn from a seeded RNG so the output is reproducible.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{SynthSpec, Waveform};
use crate::error::AppError;

/// Generate a synthetic waveform.
pub fn generate(spec: &SynthSpec) -> Result<Waveform, AppError> {
    validate(spec)?;

    let n = spec.periods * spec.samples_per_period;
    let dt = spec.period / spec.samples_per_period as f64;
    let half = spec.samples_per_period / 2;
    let first_edge = spec.samples_per_period / 4;
    let ramp_time = spec.ramp_samples as f64 * dt;
    let offset = 0.5 * (1.0 + (-spec.delay).tanh());

    let edges: Vec<(f64, f64)> = (0..2 * spec.periods)
        .map(|k| {
            let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
            ((first_edge + k * half) as f64 * dt, sign)
        })
        .collect();

    let mut rng = StdRng::seed_from_u64(spec.seed);
    let noise = if spec.noise_std > 0.0 {
        Some(
            Normal::new(0.0, spec.noise_std)
                .map_err(|e| AppError::new(2, format!("Noise distribution error: {e}")))?,
        )
    } else {
        None
    };

    let base = -0.5 * (spec.u_c + spec.u_p);
    let mut time = Vec::with_capacity(n);
    let mut voltage = Vec::with_capacity(n);

    for i in 0..n {
        let t = i as f64 * dt;
        let mut v = base;
        for &(edge, sign) in &edges {
            let s = t - edge;
            if s < 0.0 {
                break;
            }
            let capacitive = spec.u_c * (s / ramp_time).min(1.0);
            let sigmoid = 0.5 * (1.0 + (s / spec.tau - spec.delay).tanh());
            let switching = spec.u_p * (sigmoid - offset) / (1.0 - offset);
            v += sign * (capacitive + switching);
        }
        if let Some(dist) = &noise {
            v += rng.sample(dist);
        }
        time.push(t);
        voltage.push(v);
    }

    Ok(Waveform::new(time, voltage))
}

fn validate(spec: &SynthSpec) -> Result<(), AppError> {
    if spec.periods == 0 {
        return Err(AppError::new(2, "Synthetic waveform needs at least one period."));
    }
    if spec.samples_per_period < 8 {
        return Err(AppError::new(2, "Synthetic waveform needs at least 8 samples per period."));
    }
    if spec.ramp_samples == 0 {
        return Err(AppError::new(2, "Capacitive ramp must span at least one sample."));
    }
    let positive = [spec.period, spec.tau, spec.u_c, spec.u_p];
    if positive.iter().any(|v| !(v.is_finite() && *v > 0.0)) {
        return Err(AppError::new(
            2,
            "Synthetic period, tau, u_c and u_p must be finite and > 0.",
        ));
    }
    if !(spec.delay.is_finite() && spec.delay >= 0.0 && spec.noise_std.is_finite() && spec.noise_std >= 0.0) {
        return Err(AppError::new(2, "Invalid synthetic delay/noise settings."));
    }
    Ok(())
}
