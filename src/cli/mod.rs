//! Command-line parsing for the freight KPI projection tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the projection code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::domain::{Accumulation, SampleKind};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "kpi", version, about = "Freight spend vs budget with month-end projection")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Project the month, print the summary and series, and optionally plot/export.
    Report(ChartArgs),
    /// Print the merged series table only (useful for scripting).
    Table(ChartArgs),
    /// Plot a previously exported chart JSON.
    Plot(PlotArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying pipeline as `kpi report`, but renders the
    /// chart in a terminal UI using Ratatui.
    Tui(ChartArgs),
}

/// Common options for building a chart.
#[derive(Debug, Parser, Clone)]
pub struct ChartArgs {
    /// CSV with `date,value` rows; the built-in sample is used when omitted.
    #[arg(short = 'i', long, value_name = "CSV")]
    pub input: Option<PathBuf>,

    /// Built-in sample used when no CSV is given.
    #[arg(long, value_enum, default_value_t = SampleKind::Reference)]
    pub sample: SampleKind,

    /// First day of the synthetic sample (YYYY-MM-DD).
    #[arg(long, default_value = "2025-03-01")]
    pub start: NaiveDate,

    /// Number of elapsed days in the synthetic sample.
    #[arg(long, default_value_t = 15)]
    pub elapsed: usize,

    /// Random seed for the synthetic sample.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Mean daily spend for the synthetic sample.
    #[arg(long, default_value_t = 0.7)]
    pub daily_mean: f64,

    /// Daily spend standard deviation for the synthetic sample.
    #[arg(long, default_value_t = 0.2)]
    pub daily_sigma: f64,

    /// Budget for the period (constant line).
    #[arg(short = 'b', long, default_value_t = 20.0, allow_negative_numbers = true)]
    pub budget: f64,

    /// Projected period-end value; estimated from the run-rate when omitted.
    #[arg(short = 'p', long, allow_negative_numbers = true)]
    pub projected: Option<f64>,

    /// How the projected line accumulates toward the target.
    #[arg(long, value_enum, default_value_t = Accumulation::Iterative)]
    pub accumulation: Accumulation,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export the merged series to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the chart (summary + merged series) to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

/// Options for plotting a saved chart.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Chart JSON file produced by `kpi report --export-json`.
    #[arg(long, value_name = "JSON")]
    pub chart: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}
