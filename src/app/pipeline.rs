//! Shared run logic used by every subcommand.
//!
//! fetch -> year filter -> normalized columns -> trends -> charts -> CSV
//!
//! The source is a parameter so the whole flow runs against stubs in tests.

use std::fs::create_dir_all;
use std::path::{Path, PathBuf};

use crate::analysis::{Trend, add_normalized_columns, compute_trends, filter_years, sort_by_year};
use crate::data::{IndicatorSource, WorldBankClient, fetch};
use crate::domain::{COMPARISON_INDICATORS, ObservationTable, PlotConfig, RunConfig, TREND_INDICATORS, label_of};
use crate::error::AppError;
use crate::plot::{ChartData, ChartStyle, render_all};

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Year-filtered, sorted table including derived columns.
    pub table: ObservationTable,
    pub trends: Vec<Trend>,
    pub charts: Vec<PathBuf>,
    /// CSV written by the run (`None` when the CSV was the input).
    pub csv_path: Option<PathBuf>,
    /// Display name for titles and reports.
    pub country: String,
    pub period: String,
}

/// Run against the World Bank API.
pub fn run(config: &RunConfig) -> Result<RunOutput, AppError> {
    let client = WorldBankClient::from_env();
    run_with_source(&client, config)
}

pub fn run_with_source<S: IndicatorSource + ?Sized>(source: &S, config: &RunConfig) -> Result<RunOutput, AppError> {
    let raw = fetch(source, &config.request);
    if raw.is_empty() {
        tracing::warn!(country = %config.request.country, "no observations available; outputs will be empty");
    }

    let mut table = filter_years(&raw, config.years);
    let skipped = add_normalized_columns(&mut table, &labels_of(&COMPARISON_INDICATORS))?;
    if !table.is_empty() && !skipped.is_empty() {
        tracing::debug!(?skipped, "no normalized column (no usable base value)");
    }

    let country = display_country(&table, &config.request.country);
    let period = config.years.to_string();
    let trends = compute_trends(&table, &labels_of(&TREND_INDICATORS));

    let charts = if config.charts {
        let style = ChartStyle::with_size(config.chart_width, config.chart_height);
        ensure_dir(&config.out_dir)?;
        let data = ChartData {
            table: &table,
            country: &country,
            period: &period,
        };
        render_all(data, &style, &config.out_dir, &config.request.country)?
    } else {
        Vec::new()
    };

    let csv_path = config.resolved_csv_path();
    if let Some(parent) = csv_path.parent() {
        ensure_dir(parent)?;
    }
    crate::io::write_table_csv(&csv_path, &table)?;

    Ok(RunOutput {
        table,
        trends,
        charts,
        csv_path: Some(csv_path),
        country,
        period,
    })
}

/// Re-render charts and trends from an exported CSV; nothing is fetched.
pub fn plot_from_csv(config: &PlotConfig) -> Result<RunOutput, AppError> {
    let table = sort_by_year(&crate::io::read_table_csv(&config.csv_path)?);
    let period = table_period(&table);
    let country = config.country.clone();
    let trends = compute_trends(&table, &labels_of(&TREND_INDICATORS));

    ensure_dir(&config.out_dir)?;
    let style = ChartStyle::with_size(config.chart_width, config.chart_height);
    let data = ChartData {
        table: &table,
        country: &country,
        period: &period,
    };
    let charts = render_all(data, &style, &config.out_dir, &config.country)?;

    Ok(RunOutput {
        table,
        trends,
        charts,
        csv_path: None,
        country,
        period,
    })
}

fn labels_of(codes: &[&str]) -> Vec<&'static str> {
    codes.iter().filter_map(|c| label_of(c)).collect()
}

fn display_country(table: &ObservationTable, code: &str) -> String {
    table
        .source
        .country_name
        .clone()
        .unwrap_or_else(|| code.to_string())
}

/// `first-last` over the known years of a sorted table.
fn table_period(table: &ObservationTable) -> String {
    let mut years = table.rows().iter().filter_map(|r| r.year);
    match (years.next(), years.last()) {
        (Some(first), Some(last)) => format!("{first}-{last}"),
        (Some(only), None) => only.to_string(),
        _ => "no data".to_string(),
    }
}

fn ensure_dir(dir: &Path) -> Result<(), AppError> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    create_dir_all(dir)
        .map_err(|e| AppError::config(format!("Failed to create directory '{}': {e}", dir.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{INDICATORS, IndicatorRequest, SourceInfo, YearRange, default_request};
    use crate::error::FetchError;

    /// Serves a fixed table for the default indicator set.
    struct StubSource {
        table: ObservationTable,
    }

    impl IndicatorSource for StubSource {
        fn fetch_table(&self, _request: &IndicatorRequest) -> Result<ObservationTable, FetchError> {
            Ok(self.table.clone())
        }
    }

    struct DownSource;

    impl IndicatorSource for DownSource {
        fn fetch_table(&self, _request: &IndicatorRequest) -> Result<ObservationTable, FetchError> {
            Err(FetchError::Malformed("connection reset".to_string()))
        }
    }

    fn stub_table() -> ObservationTable {
        let labels: Vec<String> = INDICATORS.iter().map(|(_, l)| l.to_string()).collect();
        let mut t = ObservationTable::new(labels);
        t.source = SourceInfo {
            country_name: Some("Germany".to_string()),
            last_updated: None,
        };
        for year in [2019, 1988, 1990, 2000, 2017] {
            let x = f64::from(year - 1990);
            t.push_row(
                Some(year),
                vec![
                    Some(20.0 - 0.2 * x),
                    Some(95.0),
                    Some(10.0 + 0.1 * x),
                    None,
                    Some(1.0e12),
                    Some(8.0e7),
                    Some(20_000.0 + 500.0 * x),
                ],
            )
            .unwrap();
        }
        t.push_row(None, vec![Some(1.0); INDICATORS.len()]).unwrap();
        t
    }

    fn config(out_dir: &Path, charts: bool) -> RunConfig {
        RunConfig {
            request: default_request("DEU"),
            years: YearRange::new(1990, 2017).unwrap(),
            out_dir: out_dir.to_path_buf(),
            csv_path: None,
            charts,
            chart_width: 800,
            chart_height: 400,
        }
    }

    #[test]
    fn full_run_filters_summarizes_and_exports() {
        let dir = tempfile::tempdir().unwrap();
        let source = StubSource { table: stub_table() };
        let out = run_with_source(&source, &config(dir.path(), true)).unwrap();

        let years: Vec<_> = out.table.rows().iter().map(|r| r.year).collect();
        assert_eq!(years, vec![Some(1990), Some(2000), Some(2017)]);
        assert_eq!(out.country, "Germany");
        assert_eq!(out.period, "1990-2017");

        // Carbon intensity is all-missing: no normalized column, no trend.
        assert!(out.table.column_index("PM2.5 - Mean exposure (µg/m³)_norm").is_some());
        assert!(out.table.column_index("GHG emissions per capita (t CO2e)_norm").is_some());
        assert!(out.table.column_index("GDP carbon intensity (kg CO2e/PPP$)_norm").is_none());
        assert_eq!(out.trends.len(), 4);

        let ghg = out
            .trends
            .iter()
            .find(|t| t.label == "GHG emissions per capita (t CO2e)")
            .unwrap();
        assert_eq!(ghg.initial, 10.0);
        assert!((ghg.last - 12.7).abs() < 1e-9);
        assert!((ghg.change_pct - 27.0).abs() < 1e-9);

        let csv = out.csv_path.unwrap();
        assert_eq!(csv, dir.path().join("indicators_deu_1990_2017.csv"));
        let back = crate::io::read_table_csv(&csv).unwrap();
        assert_eq!(back.columns(), out.table.columns());
        assert_eq!(back.len(), 3);

        // Carbon intensity has no data, so its chart is skipped.
        assert_eq!(out.charts.len(), 4);
        assert!(!dir.path().join("carbon_intensity_deu.svg").exists());
    }

    #[test]
    fn failed_fetch_still_completes_with_empty_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let out = run_with_source(&DownSource, &config(dir.path(), true)).unwrap();

        assert!(out.table.is_empty());
        assert!(out.trends.is_empty());
        assert!(out.charts.is_empty());
        assert_eq!(out.country, "DEU");
        let csv = std::fs::read_to_string(out.csv_path.unwrap()).unwrap();
        assert_eq!(csv, "date\n");
    }

    #[test]
    fn plot_reads_back_an_export() {
        let dir = tempfile::tempdir().unwrap();
        let source = StubSource { table: stub_table() };
        let run_out = run_with_source(&source, &config(dir.path(), false)).unwrap();
        assert!(run_out.charts.is_empty());

        let plot_dir = dir.path().join("charts");
        let out = plot_from_csv(&PlotConfig {
            csv_path: run_out.csv_path.unwrap(),
            country: "DEU".to_string(),
            out_dir: plot_dir.clone(),
            chart_width: 800,
            chart_height: 400,
        })
        .unwrap();

        assert_eq!(out.period, "1990-2017");
        assert_eq!(out.trends, run_out.trends);
        assert_eq!(out.charts.len(), 4);
        assert!(plot_dir.join("trend_comparison_deu.svg").exists());
    }

    #[test]
    fn period_of_sorted_table() {
        let mut t = ObservationTable::new(vec!["a".to_string()]);
        assert_eq!(table_period(&t), "no data");
        t.push_row(Some(2001), vec![None]).unwrap();
        assert_eq!(table_period(&t), "2001");
        t.push_row(Some(2005), vec![None]).unwrap();
        assert_eq!(table_period(&t), "2001-2005");
    }
}
