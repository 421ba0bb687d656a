//! Debug bundle writer for inspecting segmentation and region extraction.
//!
//! The bundle is written even when region extraction fails, which is when it
//! is most useful: it shows where the extrema and borders landed.

use std::fmt::Write as _;
use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::PathBuf;

use chrono::Local;

use crate::analysis::{RegionSet, Segmentation};
use crate::error::AppError;

/// Inputs of one debug bundle.
pub struct DebugContext<'a> {
    pub source: &'a str,
    pub time: &'a [f64],
    pub segmentation: &'a Segmentation,
    pub set: &'a RegionSet,
    /// Load error message, if region extraction failed.
    pub failure: Option<String>,
}

/// Write `debug/flc_debug_<timestamp>.md` and return its path.
pub fn write_debug_bundle(ctx: &DebugContext<'_>) -> Result<PathBuf, AppError> {
    let dir = PathBuf::from("debug");
    create_dir_all(&dir).map_err(|e| AppError::new(2, format!("Failed to create debug dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("flc_debug_{ts}.md"));

    let mut file = File::create(&path).map_err(|e| AppError::new(2, format!("Failed to create debug file: {e}")))?;
    file.write_all(render_debug_markdown(ctx).as_bytes())
        .map_err(|e| AppError::new(2, format!("Failed to write debug file: {e}")))?;

    Ok(path)
}

pub fn render_debug_markdown(ctx: &DebugContext<'_>) -> String {
    let seg = ctx.segmentation;
    let at = |i: usize| ctx.time.get(i).copied().unwrap_or(f64::NAN);
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "# flc debug bundle");
    let _ = writeln!(out, "- generated: {}", Local::now().to_rfc3339());
    let _ = writeln!(out, "- source: {}", ctx.source);
    let _ = writeln!(out, "- samples: {}", ctx.time.len());
    let _ = writeln!(
        out,
        "- derivative thresholds: max={:.6e} min={:.6e}",
        seg.max_threshold, seg.min_threshold
    );
    if let Some(msg) = &ctx.failure {
        let _ = writeln!(out, "- failure: {msg}");
    }

    let _ = writeln!(out, "\n## Extrema ({})", seg.extrema.len());
    let _ = writeln!(out, "| index | time | direction | dV/dt |");
    let _ = writeln!(out, "| - | - | - | - |");
    for e in &seg.extrema {
        let d = seg.derivative.get(e.index).copied().unwrap_or(f64::NAN);
        let _ = writeln!(out, "| {} | {:e} | {} | {:.6e} |", e.index, at(e.index), e.direction.label(), d);
    }

    let _ = writeln!(out, "\n## Borders ({})", seg.borders.len());
    let _ = writeln!(out, "| index | time | direction |");
    let _ = writeln!(out, "| - | - | - |");
    for b in &seg.borders {
        let _ = writeln!(out, "| {} | {:e} | {} |", b.index, at(b.index), b.direction.label());
    }

    let _ = writeln!(out, "\n## Windows ({})", seg.windows.len());
    let _ = writeln!(out, "| # | start | end | samples | direction |");
    let _ = writeln!(out, "| - | - | - | - | - |");
    for (i, w) in seg.windows.iter().enumerate() {
        let _ = writeln!(out, "| {i} | {} | {} | {} | {} |", w.start, w.end, w.len(), w.direction.label());
    }

    let _ = writeln!(out, "\n## Regions ({})", ctx.set.len());
    let _ = writeln!(out, "| # | knee | t40 | t60 | u_p | u_c | tau_us | alpha |");
    let _ = writeln!(out, "| - | - | - | - | - | - | - | - |");
    for (i, r) in ctx.set.regions().iter().enumerate() {
        let (k, t40, t60) = (r.knee_point(), r.t40_point(), r.t60_point());
        let _ = writeln!(
            out,
            "| {i} | ({:e}, {:.4}) | ({:e}, {:.4}) | ({:e}, {:.4}) | {:.4} | {:.4} | {:.4} | {:.4} |",
            k.time,
            k.voltage,
            t40.time,
            t40.voltage,
            t60.time,
            t60.voltage,
            r.u_p(),
            r.u_c(),
            r.tau_us(),
            r.alpha()
        );
    }

    out
}
