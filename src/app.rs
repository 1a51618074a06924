//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - installs logging
//! - parses CLI arguments
//! - runs the pipeline
//! - prints the report

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, PlotArgs, RunArgs};
use crate::domain::{PlotConfig, RunConfig, YearRange, default_request};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `trends` binary.
pub fn run() -> Result<(), AppError> {
    init_tracing();

    // `trends` and `trends --country FRA` behave like `trends run ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Run(args) => handle_run(&args, true),
        Command::Fetch(args) => handle_run(&args, false),
        Command::Plot(args) => handle_plot(&args),
    }
}

/// Log to stdout; `RUST_LOG` overrides the default `info` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A subscriber may already be installed when embedded (tests, other binaries).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .with_target(false)
        .try_init();
}

fn handle_run(args: &RunArgs, allow_charts: bool) -> Result<(), AppError> {
    let config = run_config_from_args(args, allow_charts)?;
    tracing::info!(
        country = %config.request.country,
        years = %config.years,
        indicators = config.request.indicators.len(),
        "fetching indicators"
    );

    let out = pipeline::run(&config)?;
    print_report(&out);
    Ok(())
}

fn handle_plot(args: &PlotArgs) -> Result<(), AppError> {
    let config = plot_config_from_args(args);
    let out = pipeline::plot_from_csv(&config)?;
    print_report(&out);
    Ok(())
}

fn print_report(out: &pipeline::RunOutput) {
    let today = chrono::Local::now().date_naive();
    println!(
        "{}",
        crate::report::format_run_header(&out.country, &out.period, &out.table, today)
    );
    println!(
        "{}",
        crate::report::format_trend_summary(&out.country, &out.period, &out.trends)
    );
    print!(
        "{}",
        crate::report::format_outputs(out.csv_path.as_deref(), &out.charts)
    );
}

pub fn run_config_from_args(args: &RunArgs, allow_charts: bool) -> Result<RunConfig, AppError> {
    Ok(RunConfig {
        request: default_request(&args.country),
        years: YearRange::new(args.start, args.end)?,
        out_dir: args.out_dir.clone(),
        csv_path: args.csv.clone(),
        charts: allow_charts && !args.no_charts,
        chart_width: args.chart_width,
        chart_height: args.chart_height,
    })
}

pub fn plot_config_from_args(args: &PlotArgs) -> PlotConfig {
    PlotConfig {
        csv_path: args.csv.clone(),
        country: args.country.clone(),
        out_dir: args.out_dir.clone(),
        chart_width: args.chart_width,
        chart_height: args.chart_height,
    }
}

/// Rewrite argv so `trends` defaults to `trends run`.
///
/// Rules:
/// - `trends`                      -> `trends run`
/// - `trends --country FRA ...`    -> `trends run --country FRA ...`
/// - `trends --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("run".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "run" | "fetch" | "plot");
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "run".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_runs() {
        assert_eq!(rewrite_args(argv(&["trends"])), argv(&["trends", "run"]));
    }

    #[test]
    fn leading_flags_become_run_flags() {
        assert_eq!(
            rewrite_args(argv(&["trends", "-c", "FRA"])),
            argv(&["trends", "run", "-c", "FRA"])
        );
        assert_eq!(rewrite_args(argv(&["trends", "--help"])), argv(&["trends", "--help"]));
        assert_eq!(
            rewrite_args(argv(&["trends", "plot", "--csv", "a.csv"])),
            argv(&["trends", "plot", "--csv", "a.csv"])
        );
    }

    #[test]
    fn fetch_never_renders_charts() {
        let cli = crate::cli::Cli::parse_from(["trends", "fetch"]);
        let Command::Fetch(args) = cli.command else {
            panic!("expected fetch");
        };
        let config = run_config_from_args(&args, false).unwrap();
        assert!(!config.charts);
        assert_eq!(config.request.indicators.len(), crate::domain::INDICATORS.len());
    }

    #[test]
    fn inverted_year_range_is_a_config_error() {
        let cli = crate::cli::Cli::parse_from(["trends", "run", "--start", "2010", "--end", "2000"]);
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        let err = run_config_from_args(&args, true).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_CONFIG);
    }
}
