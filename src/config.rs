//! Cell parameter configuration.
//!
//! Values are layered: built-in defaults, then `.env`/environment, then CLI
//! flags. The result is validated here so the analysis engine only ever sees
//! finite, non-zero parameters.

use crate::domain::CellInputs;
use crate::error::AppError;

pub const ENV_INPUT_VOLTAGE: &str = "FLC_INPUT_VOLTAGE";
pub const ENV_THICKNESS_UM: &str = "FLC_THICKNESS_UM";
pub const ENV_AREA_MM2: &str = "FLC_AREA_MM2";
pub const ENV_CAPACITANCE_NF: &str = "FLC_CAPACITANCE_NF";
pub const ENV_TILT_DEG: &str = "FLC_TILT_DEG";

/// Tilt angles (degrees) near 0 drive `sin²θ` in the anisotropy toward zero.
pub const TILT_RANGE_DEG: (f64, f64) = (1.0, 89.0);

/// Optional per-field overrides (CLI flags).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CellOverrides {
    pub input_voltage: Option<f64>,
    pub thickness_um: Option<f64>,
    pub area_mm2: Option<f64>,
    pub capacitance_nf: Option<f64>,
    pub tilt_deg: Option<f64>,
}

impl CellOverrides {
    pub fn apply(&self, inputs: &mut CellInputs) {
        if let Some(v) = self.input_voltage {
            inputs.input_voltage = v;
        }
        if let Some(v) = self.thickness_um {
            inputs.thickness_um = v;
        }
        if let Some(v) = self.area_mm2 {
            inputs.area_mm2 = v;
        }
        if let Some(v) = self.capacitance_nf {
            inputs.capacitance_nf = v;
        }
        if let Some(v) = self.tilt_deg {
            inputs.tilt_deg = v;
        }
    }
}

/// Defaults overlaid with `.env`/environment values.
pub fn cell_inputs_from_env() -> Result<CellInputs, AppError> {
    dotenvy::dotenv().ok();
    cell_inputs_from_lookup(CellInputs::default(), |key| std::env::var(key).ok())
}

/// Overlay values found by `lookup` onto `base`.
pub fn cell_inputs_from_lookup<F>(base: CellInputs, lookup: F) -> Result<CellInputs, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut inputs = base;
    let fields: [(&str, &mut f64); 5] = [
        (ENV_INPUT_VOLTAGE, &mut inputs.input_voltage),
        (ENV_THICKNESS_UM, &mut inputs.thickness_um),
        (ENV_AREA_MM2, &mut inputs.area_mm2),
        (ENV_CAPACITANCE_NF, &mut inputs.capacitance_nf),
        (ENV_TILT_DEG, &mut inputs.tilt_deg),
    ];
    for (key, slot) in fields {
        let Some(raw) = lookup(key) else { continue };
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        *slot = raw
            .parse::<f64>()
            .map_err(|_| AppError::new(2, format!("Invalid {key}='{raw}' (expected a number).")))?;
    }
    Ok(inputs)
}

/// Resolve the final cell inputs: defaults, environment, then CLI overrides.
pub fn resolve_cell_inputs(overrides: &CellOverrides) -> Result<CellInputs, AppError> {
    let mut inputs = cell_inputs_from_env()?;
    overrides.apply(&mut inputs);
    validate_cell_inputs(&inputs)?;
    Ok(inputs)
}

pub fn validate_cell_inputs(inputs: &CellInputs) -> Result<(), AppError> {
    let fields = [
        ("input voltage", inputs.input_voltage),
        ("thickness", inputs.thickness_um),
        ("area", inputs.area_mm2),
        ("capacitance", inputs.capacitance_nf),
        ("tilt angle", inputs.tilt_deg),
    ];
    for (name, value) in fields {
        if !value.is_finite() || value == 0.0 {
            return Err(AppError::new(2, format!("Cell {name} must be finite and non-zero (got {value}).")));
        }
    }
    let (lo, hi) = TILT_RANGE_DEG;
    if !(lo..=hi).contains(&inputs.tilt_deg) {
        return Err(AppError::new(
            2,
            format!("Tilt angle must be within [{lo}, {hi}] degrees (got {}).", inputs.tilt_deg),
        ));
    }
    Ok(())
}
