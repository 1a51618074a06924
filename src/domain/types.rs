//! Shared domain types.
//!
//! The observation table is deliberately row-oriented: one row per year, one
//! optional value per indicator column. That matches how it is filtered (by
//! year), exported (CSV rows) and read back.

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::error::AppError;

/// Name of the explicit year column in exports.
pub const YEAR_COLUMN: &str = "date";

/// Suffix appended to a column label for its base-100 normalized companion.
pub const NORMALIZED_SUFFIX: &str = "_norm";

/// One requested indicator: source code + display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indicator {
    pub code: String,
    pub label: String,
}

/// What to fetch: one country, a set of indicators.
///
/// Codes are unique; the first occurrence wins if a caller passes duplicates.
/// Insertion order is kept and becomes the table's column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorRequest {
    pub country: String,
    pub indicators: Vec<Indicator>,
}

impl IndicatorRequest {
    pub fn new<I, C, L>(country: impl Into<String>, indicators: I) -> Self
    where
        I: IntoIterator<Item = (C, L)>,
        C: Into<String>,
        L: Into<String>,
    {
        let mut out: Vec<Indicator> = Vec::new();
        for (code, label) in indicators {
            let code = code.into();
            if out.iter().any(|i| i.code == code) {
                continue;
            }
            out.push(Indicator {
                code,
                label: label.into(),
            });
        }
        Self {
            country: country.into(),
            indicators: out,
        }
    }

    pub fn labels(&self) -> Vec<String> {
        self.indicators.iter().map(|i| i.label.clone()).collect()
    }

    pub fn position(&self, code: &str) -> Option<usize> {
        self.indicators.iter().position(|i| i.code == code)
    }

    /// Codes joined the way the API expects multi-indicator paths (`A;B;C`).
    pub fn joined_codes(&self) -> String {
        self.indicators
            .iter()
            .map(|i| i.code.as_str())
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// Inclusive year range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Result<Self, AppError> {
        if start > end {
            return Err(AppError::config(format!(
                "Invalid year range: start {start} is after end {end}."
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.start..=self.end).contains(&year)
    }
}

impl std::fmt::Display for YearRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// One table row. `year` is `None` when the source date could not be read as a year.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationRow {
    pub year: Option<i32>,
    pub values: Vec<Option<f64>>,
}

/// Metadata reported by the source alongside the observations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceInfo {
    /// Display name of the country as the source spells it (e.g. "Germany").
    pub country_name: Option<String>,
    pub last_updated: Option<NaiveDate>,
}

/// Reshaped time series: one row per year, one column per indicator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationTable {
    columns: Vec<String>,
    rows: Vec<ObservationRow>,
    pub source: SourceInfo,
}

impl ObservationTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            source: SourceInfo::default(),
        }
    }

    /// The "no data" table returned when a fetch fails.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[ObservationRow] {
        &self.rows
    }

    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == label)
    }

    pub fn push_row(&mut self, year: Option<i32>, values: Vec<Option<f64>>) -> Result<(), AppError> {
        if values.len() != self.columns.len() {
            return Err(AppError::data(format!(
                "Row for year {year:?} has {} values, expected {}.",
                values.len(),
                self.columns.len()
            )));
        }
        self.rows.push(ObservationRow { year, values });
        Ok(())
    }

    /// Append a derived column; `values` must be aligned with the existing rows.
    pub fn add_column(&mut self, label: impl Into<String>, values: Vec<Option<f64>>) -> Result<(), AppError> {
        let label = label.into();
        if values.len() != self.rows.len() {
            return Err(AppError::data(format!(
                "Column '{label}' has {} values for {} rows.",
                values.len(),
                self.rows.len()
            )));
        }
        if self.column_index(&label).is_some() {
            return Err(AppError::data(format!("Column '{label}' already exists.")));
        }
        self.columns.push(label);
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.values.push(value);
        }
        Ok(())
    }

    /// Raw column values aligned with rows (missing values kept as `None`).
    pub fn column(&self, label: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.column_index(label)?;
        Some(self.rows.iter().map(|r| r.values[idx]).collect())
    }

    /// `(year, value)` pairs for one column, in row order, with missing values and
    /// unknown years dropped. An unknown column yields an empty series.
    pub fn series(&self, label: &str) -> Vec<(i32, f64)> {
        let Some(idx) = self.column_index(label) else {
            return Vec::new();
        };
        self.rows
            .iter()
            .filter_map(|r| match (r.year, r.values[idx]) {
                (Some(year), Some(v)) => Some((year, v)),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn with_rows(columns: Vec<String>, rows: Vec<ObservationRow>, source: SourceInfo) -> Self {
        Self { columns, rows, source }
    }
}

/// A fetch-and-analyse run as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub request: IndicatorRequest,
    pub years: YearRange,
    pub out_dir: PathBuf,
    /// Explicit CSV path; defaults to `indicators_<iso>_<start>_<end>.csv` in `out_dir`.
    pub csv_path: Option<PathBuf>,
    pub charts: bool,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl RunConfig {
    pub fn resolved_csv_path(&self) -> PathBuf {
        match &self.csv_path {
            Some(path) => path.clone(),
            None => self.out_dir.join(format!(
                "indicators_{}_{}_{}.csv",
                self.request.country.to_lowercase(),
                self.years.start,
                self.years.end
            )),
        }
    }
}

/// Re-rendering charts from an exported CSV.
#[derive(Debug, Clone)]
pub struct PlotConfig {
    pub csv_path: PathBuf,
    pub country: String,
    pub out_dir: PathBuf,
    pub chart_width: u32,
    pub chart_height: u32,
}
