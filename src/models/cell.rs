//! Physical quantities of an FLC cell.
//!
//! The extraction engine measures `u_p`, `tau` and `alpha` per region; the
//! quantities below combine them with the cell constants:
//!
//! - spontaneous polarization `Ps = u_p·C / (2S)`
//! - rotational viscosity `γ = tau·Ps·U / d`
//! - dielectric anisotropy `Δε = alpha·Ps·d / (U·ε0·sin²θ)`
//!
//! Inputs are SI; the display scalings match the units the results are
//! reported in (nC/cm² for `Ps`).

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::domain::CellInputs;

/// Vacuum permittivity (F/m).
pub const EPSILON_0: f64 = 8.854e-12;

/// `Ps` display scaling (C/m² → nC/cm²).
pub const POLARIZATION_SCALE: f64 = 1e5;

/// Rotational viscosity display scaling.
pub const VISCOSITY_SCALE: f64 = 10.0;

/// Cell constants in SI units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellParams {
    /// V
    pub input_voltage: f64,
    /// m
    pub thickness: f64,
    /// m²
    pub area: f64,
    /// F
    pub capacitance: f64,
    /// rad
    pub tilt_angle: f64,
}

impl Default for CellParams {
    fn default() -> Self {
        CellParams::from_inputs(&CellInputs::default())
    }
}

impl CellParams {
    pub fn from_inputs(inputs: &CellInputs) -> Self {
        Self {
            input_voltage: inputs.input_voltage,
            thickness: um_to_m(inputs.thickness_um),
            area: mm2_to_m2(inputs.area_mm2),
            capacitance: nf_to_f(inputs.capacitance_nf),
            tilt_angle: deg_to_rad(inputs.tilt_deg),
        }
    }
}

pub fn um_to_m(um: f64) -> f64 {
    um / 1e6
}

pub fn mm2_to_m2(mm2: f64) -> f64 {
    mm2 / 1e6
}

pub fn nf_to_f(nf: f64) -> f64 {
    nf / 1e9
}

pub fn deg_to_rad(deg: f64) -> f64 {
    deg * PI / 180.0
}

/// Raw spontaneous polarization (C/m²).
pub fn polarization(u_p: f64, params: &CellParams) -> f64 {
    (u_p * params.capacitance) / (2.0 * params.area)
}

/// Raw rotational viscosity, from the raw polarization.
pub fn viscosity(tau: f64, polarization: f64, params: &CellParams) -> f64 {
    (tau * polarization * params.input_voltage) / params.thickness
}

/// Dielectric anisotropy, from the raw polarization.
pub fn anisotropy(alpha: f64, polarization: f64, params: &CellParams) -> f64 {
    let sin = params.tilt_angle.sin();
    (alpha * polarization * params.thickness) / (params.input_voltage * EPSILON_0 * sin * sin)
}
