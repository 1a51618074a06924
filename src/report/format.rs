//! Formatted terminal output.
//!
//! We keep formatting code in one place so the analysis code stays free of
//! presentation concerns and output changes stay localized.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::analysis::Trend;
use crate::domain::ObservationTable;

const RULE_WIDTH: usize = 50;

/// Header printed before the statistics block.
pub fn format_run_header(country: &str, period: &str, table: &ObservationTable, generated: NaiveDate) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== trends - {country} ({period}) ===\n"));
    out.push_str(&format!("Generated: {generated}\n"));
    if let Some(updated) = table.source.last_updated {
        out.push_str(&format!("Source last updated: {updated}\n"));
    }
    out.push_str(&format!(
        "Rows: {} | columns: {}\n",
        table.len(),
        table.columns().len()
    ));
    out
}

/// The trend statistics block: one line per indicator with enough data.
pub fn format_trend_summary(country: &str, period: &str, trends: &[Trend]) -> String {
    let mut out = String::new();
    out.push_str(&format!("\nSTATISTICS - {} ({period})\n", country.to_uppercase()));
    out.push_str(&"=".repeat(RULE_WIDTH));
    out.push('\n');

    if trends.is_empty() {
        out.push_str("No indicator has enough observations for a trend.\n");
        return out;
    }

    for trend in trends {
        out.push_str(&format_trend_line(trend));
        out.push('\n');
    }
    out
}

pub fn format_trend_line(trend: &Trend) -> String {
    format!(
        "{:40}: {:6.1} → {:6.1} ({:+.1}%)",
        trend.label, trend.initial, trend.last, trend.change_pct
    )
}

/// Closing summary: where outputs went.
pub fn format_outputs(csv: Option<&Path>, charts: &[PathBuf]) -> String {
    let mut out = String::new();
    if let Some(path) = csv {
        out.push_str(&format!("\nData saved to '{}'\n", path.display()));
    }
    if !charts.is_empty() {
        out.push_str(&format!("Charts written ({}):\n", charts.len()));
        for path in charts {
            out.push_str(&format!("  - {}\n", path.display()));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trend(label: &str, initial: f64, last: f64) -> Trend {
        Trend {
            label: label.to_string(),
            first_year: 1990,
            last_year: 2017,
            initial,
            last,
            change_pct: crate::analysis::percent_change(initial, last),
        }
    }

    #[test]
    fn trend_line_golden() {
        let line = format_trend_line(&trend("GHG emissions per capita (t CO2e)", 10.0, 15.0));
        assert_eq!(
            line,
            "GHG emissions per capita (t CO2e)       :   10.0 →   15.0 (+50.0%)"
        );
        let down = format_trend_line(&trend("x", 20.0, 15.0));
        assert!(down.ends_with("(-25.0%)"), "{down}");
    }

    #[test]
    fn summary_reports_when_nothing_to_show() {
        let txt = format_trend_summary("Germany", "1990-2017", &[]);
        assert!(txt.contains("STATISTICS - GERMANY (1990-2017)"));
        assert!(txt.contains("No indicator has enough observations"));
    }

    #[test]
    fn header_includes_source_date_when_known() {
        let mut table = ObservationTable::new(vec!["a".to_string()]);
        table.source.last_updated = NaiveDate::from_ymd_opt(2025, 7, 1);
        let generated = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        let txt = format_run_header("Germany", "1990-2017", &table, generated);
        assert!(txt.contains("Source last updated: 2025-07-01"));
        assert!(txt.contains("Generated: 2026-01-02"));
        assert!(txt.contains("Rows: 0 | columns: 1"));
    }

    #[test]
    fn outputs_list_paths() {
        let charts = vec![PathBuf::from("a.svg"), PathBuf::from("b.svg")];
        let txt = format_outputs(Some(Path::new("data.csv")), &charts);
        assert!(txt.contains("Data saved to 'data.csv'"));
        assert!(txt.contains("Charts written (2)"));
        assert!(format_outputs(None, &[]).is_empty());
    }
}
