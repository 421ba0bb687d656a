//! Export per-region results and waveforms to CSV.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::{RegionSummary, Waveform};
use crate::error::AppError;

/// Write per-region results to a CSV file.
pub fn write_regions_csv(path: &Path, regions: &[RegionSummary]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(file);
    write_regions(&mut out, regions)
        .and_then(|_| out.flush())
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV: {e}")))
}

/// Write a waveform as `time,voltage` rows (readable back by `flc analyze`).
pub fn write_waveform_csv(path: &Path, waveform: &Waveform) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create waveform CSV '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(file);
    write_waveform(&mut out, waveform)
        .and_then(|_| out.flush())
        .map_err(|e| AppError::new(2, format!("Failed to write waveform CSV: {e}")))
}

fn write_regions<W: Write>(out: &mut W, regions: &[RegionSummary]) -> std::io::Result<()> {
    writeln!(
        out,
        "index,direction,start_time,end_time,knee_time,knee_voltage,t40_time,t40_voltage,t60_time,t60_voltage,u_p,u_c,tau_us,alpha,polarization,viscosity,anisotropy"
    )?;
    for (i, r) in regions.iter().enumerate() {
        writeln!(
            out,
            "{},{},{:e},{:e},{:e},{:.6},{:e},{:.6},{:e},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6}",
            i,
            r.direction.label(),
            r.start_time,
            r.end_time,
            r.knee.time,
            r.knee.voltage,
            r.t40.time,
            r.t40.voltage,
            r.t60.time,
            r.t60.voltage,
            r.u_p,
            r.u_c,
            r.tau_us,
            r.alpha,
            r.polarization,
            r.viscosity,
            r.anisotropy,
        )?;
    }
    Ok(())
}

fn write_waveform<W: Write>(out: &mut W, waveform: &Waveform) -> std::io::Result<()> {
    writeln!(out, "time,voltage")?;
    for (t, v) in waveform.time.iter().zip(&waveform.voltage) {
        writeln!(out, "{t:e},{v:.9}")?;
    }
    Ok(())
}
