//! Oscilloscope CSV ingest.
//!
//! Scope exports are two numeric columns (time, voltage) after a free-form
//! preamble, sometimes with leading empty columns and often not valid UTF-8.
//! The reader:
//!
//! - skips a configurable number of leading rows
//! - shifts both columns right when the time cell is empty, and only the
//!   voltage column when the voltage cell is empty (the shift sticks for later rows)
//! - records unparseable rows as row errors instead of aborting

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ByteRecord;
use tracing::{info, warn};

use crate::domain::Waveform;
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: the waveform plus what happened to each row.
#[derive(Debug, Clone)]
pub struct IngestedWaveform {
    pub waveform: Waveform,
    pub row_errors: Vec<RowError>,
    /// Rows seen after the skipped preamble.
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load a `(time, voltage)` waveform from a scope CSV export.
pub fn load_waveform_csv(path: &Path, skip_rows: usize) -> Result<IngestedWaveform, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    let ingested = read_waveform(file, skip_rows)?;
    info!(
        path = %path.display(),
        rows_read = ingested.rows_read,
        rows_used = ingested.rows_used,
        row_errors = ingested.row_errors.len(),
        "waveform CSV loaded"
    );
    Ok(ingested)
}

/// Parse a waveform from any CSV byte stream.
pub fn read_waveform<R: Read>(source: R, skip_rows: usize) -> Result<IngestedWaveform, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let mut time = Vec::new();
    let mut voltage = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;
    let mut time_col = 0usize;
    let mut volt_col = 1usize;

    for (idx, result) in reader.byte_records().enumerate() {
        let line = idx + 1;
        if idx < skip_rows {
            continue;
        }
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                push_row_error(&mut row_errors, line, format!("CSV parse error: {e}"));
                continue;
            }
        };

        if field_is_empty(&record, time_col) {
            time_col += 1;
            volt_col += 1;
            continue;
        }
        if field_is_empty(&record, volt_col) {
            volt_col += 1;
            continue;
        }

        match (parse_field(&record, time_col), parse_field(&record, volt_col)) {
            (Ok(t), Ok(v)) => {
                time.push(t);
                voltage.push(v);
            }
            (Err(e), _) | (_, Err(e)) => push_row_error(&mut row_errors, line, e),
        }
    }

    let rows_used = time.len();
    if rows_used == 0 {
        return Err(AppError::new(3, "No numeric (time, voltage) rows found in CSV."));
    }

    Ok(IngestedWaveform {
        waveform: Waveform::new(time, voltage),
        row_errors,
        rows_read,
        rows_used,
    })
}

fn push_row_error(errors: &mut Vec<RowError>, line: usize, message: String) {
    warn!(line, %message, "skipping CSV row");
    errors.push(RowError { line, message });
}

/// A missing cell (short row) is not "empty": it is a row error.
fn field_is_empty(record: &ByteRecord, col: usize) -> bool {
    matches!(record.get(col), Some(cell) if cell.is_empty())
}

fn parse_field(record: &ByteRecord, col: usize) -> Result<f64, String> {
    let raw = record
        .get(col)
        .ok_or_else(|| format!("Missing column {}.", col + 1))?;
    let text = String::from_utf8_lossy(raw);
    let value = text
        .parse::<f64>()
        .map_err(|_| format!("Invalid number '{text}' in column {}.", col + 1))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("Non-finite value in column {}.", col + 1))
    }
}
