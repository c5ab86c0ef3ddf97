//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory while projecting and plotting
//! - exported to JSON/CSV
//! - reloaded later for plotting

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// One realized observation on the actual channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActualPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl ActualPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// One day of the merged chart series.
///
/// Channels that do not apply to the date are `None` (serialized as `null`),
/// so every point has the same shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MergedPoint {
    pub date: NaiveDate,
    pub actual: Option<f64>,
    pub budget: Option<f64>,
    pub projected: Option<f64>,
}

impl MergedPoint {
    pub fn budget_only(date: NaiveDate, budget: f64) -> Self {
        Self {
            date,
            actual: None,
            budget: Some(budget),
            projected: None,
        }
    }
}

/// How the projected line steps from the last actual value to the target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Accumulation {
    /// `running += increment` day over day (matches the dashboard chart).
    #[default]
    Iterative,
    /// `last_actual + i * increment`.
    ClosedForm,
}

impl Accumulation {
    pub fn label(self) -> &'static str {
        match self {
            Accumulation::Iterative => "iterative",
            Accumulation::ClosedForm => "closed-form",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Accumulation::Iterative => Accumulation::ClosedForm,
            Accumulation::ClosedForm => Accumulation::Iterative,
        }
    }
}

/// Where the actual series comes from when no CSV is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SampleKind {
    /// The fixed March 2025 freight-spend series.
    Reference,
    /// Seeded random cumulative spend.
    Synthetic,
}

/// Projected period-end total relative to budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BudgetStatus {
    UnderBudget,
    OnBudget,
    OverBudget,
}

impl BudgetStatus {
    pub fn display_name(self) -> &'static str {
        match self {
            BudgetStatus::UnderBudget => "under budget",
            BudgetStatus::OnBudget => "on budget",
            BudgetStatus::OverBudget => "over budget",
        }
    }
}

/// Headline figures derived from a merged series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub last_actual_date: NaiveDate,
    pub last_actual: f64,
    /// Calendar days from `period_start` through `last_actual_date`.
    pub days_elapsed: i64,
    pub days_remaining: i64,
    /// `None` when the period is already complete.
    pub daily_increment: Option<f64>,
    pub budget: f64,
    pub projected: f64,
    /// Whether `projected` was supplied or estimated from the run-rate.
    pub projected_is_run_rate: bool,
    pub variance: f64,
    /// `None` when the budget is zero.
    pub variance_pct: Option<f64>,
    pub status: BudgetStatus,
    pub accumulation: Accumulation,
}

/// Synthetic sample settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleConfig {
    pub kind: SampleKind,
    pub start: NaiveDate,
    pub elapsed_days: usize,
    pub seed: u64,
    pub daily_mean: f64,
    pub daily_sigma: f64,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct KpiConfig {
    /// CSV with `date,value` rows; the sample source is used when absent.
    pub input: Option<PathBuf>,
    pub sample: SampleConfig,

    pub budget: f64,
    /// Period-end target; estimated from the run-rate when absent.
    pub projected: Option<f64>,
    pub accumulation: Accumulation,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_csv: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}

/// A saved chart file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartFile {
    pub tool: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub accumulation: Accumulation,
    pub summary: KpiSummary,
    pub points: Vec<MergedPoint>,
}
