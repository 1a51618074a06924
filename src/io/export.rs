//! Export the observation table to CSV.
//!
//! Layout: `date` first, then every column in table order (indicators followed by
//! derived `_norm` columns). Missing values are empty fields. Numbers use Rust's
//! shortest round-trip formatting so a re-read yields the same `f64`.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{ObservationTable, YEAR_COLUMN};
use crate::error::AppError;

/// Write `table` to `path`, creating or truncating the file.
///
/// An empty table still produces a header-only file.
pub fn write_table_csv(path: &Path, table: &ObservationTable) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::config(format!("Failed to create CSV '{}': {e}", path.display())))?;
    write_table(file, table)?;
    tracing::info!(path = %path.display(), rows = table.len(), "wrote CSV");
    Ok(())
}

pub fn write_table<W: Write>(writer: W, table: &ObservationTable) -> Result<(), AppError> {
    let mut out = csv::Writer::from_writer(writer);

    let mut header = Vec::with_capacity(table.columns().len() + 1);
    header.push(YEAR_COLUMN);
    header.extend(table.columns().iter().map(String::as_str));
    out.write_record(&header)
        .map_err(|e| AppError::config(format!("Failed to write CSV header: {e}")))?;

    for row in table.rows() {
        let mut record = Vec::with_capacity(row.values.len() + 1);
        record.push(row.year.map(|y| y.to_string()).unwrap_or_default());
        record.extend(row.values.iter().map(|v| v.map(|v| v.to_string()).unwrap_or_default()));
        out.write_record(&record)
            .map_err(|e| AppError::config(format!("Failed to write CSV row: {e}")))?;
    }

    out.flush()
        .map_err(|e| AppError::config(format!("Failed to flush CSV: {e}")))?;
    Ok(())
}
