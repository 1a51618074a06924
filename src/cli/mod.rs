//! Command-line parsing for the indicator trends tool.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! fetch/analysis code. Defaults reproduce the canonical run: Germany, 1990-2017,
//! outputs in the current directory.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{DEFAULT_COUNTRY, DEFAULT_END_YEAR, DEFAULT_START_YEAR};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "trends",
    version,
    about = "Environmental and economic indicator trends from World Bank data"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch indicators, render charts, print trend statistics and export CSV.
    Run(RunArgs),
    /// Same as `run` without charts (useful for scripting).
    Fetch(RunArgs),
    /// Re-render charts and statistics from a previously exported CSV.
    Plot(PlotArgs),
}

/// Options shared by `run` and `fetch`.
#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    /// Country code (ISO3, e.g. DEU; ISO2 also accepted by the API).
    #[arg(short = 'c', long, default_value = DEFAULT_COUNTRY, value_parser = parse_country_code)]
    pub country: String,

    /// First year kept (inclusive).
    #[arg(long, default_value_t = DEFAULT_START_YEAR)]
    pub start: i32,

    /// Last year kept (inclusive).
    #[arg(long, default_value_t = DEFAULT_END_YEAR)]
    pub end: i32,

    /// Directory for charts and the default CSV.
    #[arg(short = 'o', long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Write the CSV here instead of the default name in --out-dir.
    #[arg(long, value_name = "CSV")]
    pub csv: Option<PathBuf>,

    /// Skip chart rendering.
    #[arg(long)]
    pub no_charts: bool,

    /// Chart width (px).
    #[arg(long, default_value_t = 1800)]
    pub chart_width: u32,

    /// Chart height (px) of single-panel charts.
    #[arg(long, default_value_t = 750)]
    pub chart_height: u32,
}

/// Options for plotting a saved CSV.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// CSV produced by `trends run` or `trends fetch`.
    #[arg(long, value_name = "CSV")]
    pub csv: PathBuf,

    /// Country code used in output file names and titles.
    #[arg(short = 'c', long, default_value = DEFAULT_COUNTRY, value_parser = parse_country_code)]
    pub country: String,

    /// Directory for charts.
    #[arg(short = 'o', long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Chart width (px).
    #[arg(long, default_value_t = 1800)]
    pub chart_width: u32,

    /// Chart height (px) of single-panel charts.
    #[arg(long, default_value_t = 750)]
    pub chart_height: u32,
}

/// Accept 2-3 ASCII letters/digits and upper-case them.
pub fn parse_country_code(raw: &str) -> Result<String, String> {
    let code = raw.trim();
    let valid = (2..=3).contains(&code.len()) && code.chars().all(|c| c.is_ascii_alphanumeric());
    if !valid {
        return Err(format!("'{raw}' is not a country code (expected e.g. DEU)"));
    }
    Ok(code.to_ascii_uppercase())
}
