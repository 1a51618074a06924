//! Read an exported observation CSV back into a table.
//!
//! Accepts what `export` writes, plus the common variations of hand-edited or
//! spreadsheet-saved files: a UTF-8 BOM on the first header, padded fields, and
//! years written as floats (`1990.0`).

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{ObservationTable, YEAR_COLUMN};
use crate::error::AppError;

/// Load a table from `path`. The `date` column is required; every other column is
/// read as an optional number.
pub fn read_table_csv(path: &Path) -> Result<ObservationTable, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::config(format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_table(file)
}

pub fn read_table<R: Read>(reader: R) -> Result<ObservationTable, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::data(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let names = normalize_headers(&headers);

    let year_idx = names
        .iter()
        .position(|n| n == YEAR_COLUMN)
        .ok_or_else(|| AppError::data(format!("CSV has no '{YEAR_COLUMN}' column.")))?;

    let value_idx: Vec<usize> = (0..names.len()).filter(|&i| i != year_idx).collect();
    let columns = value_idx.iter().map(|&i| names[i].clone()).collect();
    let mut table = ObservationTable::new(columns);

    for (idx, result) in reader.records().enumerate() {
        // Line 1 is the header.
        let line = idx + 2;
        let record = result.map_err(|e| AppError::data(format!("CSV parse error on line {line}: {e}")))?;

        let year = parse_year_field(record.get(year_idx).unwrap_or(""))
            .map_err(|msg| AppError::data(format!("Line {line}: {msg}")))?;

        let mut values = Vec::with_capacity(value_idx.len());
        for &i in &value_idx {
            let raw = record.get(i).unwrap_or("");
            let value = parse_value(raw).map_err(|msg| {
                AppError::data(format!("Line {line}, column '{}': {msg}", names[i]))
            })?;
            values.push(value);
        }

        table.push_row(year, values)?;
    }

    Ok(table)
}

fn normalize_headers(headers: &StringRecord) -> Vec<String> {
    headers
        .iter()
        .map(|name| name.trim().trim_start_matches('\u{feff}').to_string())
        .collect()
}

fn parse_year_field(raw: &str) -> Result<Option<i32>, String> {
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(year) = raw.parse::<i32>() {
        return Ok(Some(year));
    }
    match raw.parse::<f64>() {
        Ok(v) if v.fract() == 0.0 && v.abs() < 1e6 => Ok(Some(v as i32)),
        _ => Err(format!("invalid year '{raw}'")),
    }
}

fn parse_value(raw: &str) -> Result<Option<f64>, String> {
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    let v = raw
        .parse::<f64>()
        .map_err(|_| format!("invalid number '{raw}'"))?;
    Ok(v.is_finite().then_some(v))
}
