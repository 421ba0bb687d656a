//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the analysis code stays free of display precision and scaling choices
//! - output changes are localized
//!
//! Everything renders from `AnalysisFile`, so a fresh run and a saved summary
//! (`flc show`) print the same tables.

use crate::domain::{AnalysisFile, CellInputs, MeanValues, RegionSummary};

/// Format the run header (source, cell parameters) plus region table and means.
pub fn format_run_summary(file: &AnalysisFile, skipped_rows: usize) -> String {
    let mut out = String::new();

    out.push_str("=== flc - FLC switching analysis ===\n");
    out.push_str(&format!("Source: {}\n", file.source));
    out.push_str(&format!("Samples: n={}", file.samples));
    if skipped_rows > 0 {
        out.push_str(&format!(" (skipped {skipped_rows} bad rows)"));
    }
    out.push('\n');
    out.push_str(&format_cell(&file.cell));
    out.push('\n');

    out.push_str(&format!("Regions: {}\n", file.regions.len()));
    out.push_str(&format_region_table(&file.regions));
    out.push('\n');
    out.push_str(&format_means(file.means.as_ref()));

    out
}

/// Format a saved summary file (`flc show`).
pub fn format_saved_summary(file: &AnalysisFile) -> String {
    let mut out = format!(
        "Saved analysis ({} @ {})\n",
        file.tool,
        file.generated_at.format("%Y-%m-%d %H:%M:%S")
    );
    out.push_str(&format_run_summary(file, 0));
    out
}

pub fn format_cell(cell: &CellInputs) -> String {
    format!(
        "Cell: U={} V | d={} µm | A={} mm² | C={} nF | θ={}°\n",
        cell.input_voltage, cell.thickness_um, cell.area_mm2, cell.capacitance_nf, cell.tilt_deg
    )
}

/// One row per region, in time order.
pub fn format_region_table(regions: &[RegionSummary]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:>3} {:<8} {:>11} {:>11} {:>8} {:>8} {:>9} {:>8} {:>9} {:>9} {:>9}\n",
            "#", "dir", "start[s]", "end[s]", "Up[V]", "Uc[V]", "tau[µs]", "alpha", "Ps", "visc", "anis"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<3} {:-<8} {:-<11} {:-<11} {:-<8} {:-<8} {:-<9} {:-<8} {:-<9} {:-<9} {:-<9}\n",
            "", "", "", "", "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for (i, r) in regions.iter().enumerate() {
        out.push_str(
            format!(
                "{:>3} {:<8} {:>11.4e} {:>11.4e} {:>8.3} {:>8.3} {:>9.3} {:>8.4} {:>9.4} {:>9.4} {:>9.4}\n",
                i,
                r.direction.label(),
                r.start_time,
                r.end_time,
                r.u_p,
                r.u_c,
                r.tau_us,
                r.alpha,
                r.polarization,
                r.viscosity,
                r.anisotropy,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

pub fn format_means(means: Option<&MeanValues>) -> String {
    match means {
        Some(m) => format!(
            "Mean Ps = {:.4} nC/cm² | mean viscosity = {:.4} P | mean anisotropy = {:.4}\n",
            m.polarization, m.viscosity, m.anisotropy
        ),
        None => "Means: n/a (no regions)\n".to_string(),
    }
}

/// Detail panel for the region containing `at`.
pub fn format_region_detail(region: Option<&RegionSummary>, at: f64) -> String {
    let Some(r) = region else {
        return format!("No region contains t={at:e} s.\n");
    };

    let mut out = String::new();
    out.push_str(&format!(
        "Region at t={at:e} s ({}, {:e} .. {:e} s)\n",
        r.direction.label(),
        r.start_time,
        r.end_time
    ));
    out.push_str(&format!("- knee : t={:e} s, U={:.4} V\n", r.knee.time, r.knee.voltage));
    out.push_str(&format!("- t40  : t={:e} s, U={:.4} V\n", r.t40.time, r.t40.voltage));
    out.push_str(&format!("- t60  : t={:e} s, U={:.4} V\n", r.t60.time, r.t60.voltage));
    out.push_str(&format!("- Up={:.4} V  Uc={:.4} V\n", r.u_p, r.u_c));
    out.push_str(&format!("- tau={:.4} µs  alpha={:.4}\n", r.tau_us, r.alpha));
    out.push_str(&format!(
        "- Ps={:.4}  viscosity={:.4}  anisotropy={:.4}\n",
        r.polarization, r.viscosity, r.anisotropy
    ));
    out
}
