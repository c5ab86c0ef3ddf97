//! Shared "projection pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! actual series (CSV or sample) -> period-end target -> merge -> summary
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use crate::data::generate_sample;
use crate::domain::{Accumulation, ActualPoint, KpiConfig, KpiSummary, MergedPoint};
use crate::error::{AppError, ProjectionError};
use crate::io::ingest::load_actual_series;
use crate::projection::{ProjectionMerger, run_rate_projection};
use crate::report::summarize;

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub actual: Vec<ActualPoint>,
    pub merged: Vec<MergedPoint>,
    pub summary: KpiSummary,
}

/// Execute the full pipeline for a CLI/TUI configuration.
pub fn run(config: &KpiConfig) -> Result<RunOutput, AppError> {
    let actual = load_actuals(config)?;
    let run = run_projection(actual, config.budget, config.projected, config.accumulation)?;
    Ok(run)
}

/// Resolve the actual series: the CSV when one is configured, else the sample.
pub fn load_actuals(config: &KpiConfig) -> Result<Vec<ActualPoint>, AppError> {
    match &config.input {
        Some(path) => Ok(load_actual_series(path)?.points),
        None => {
            tracing::debug!(kind = ?config.sample.kind, "using built-in sample series");
            generate_sample(&config.sample)
        }
    }
}

/// Project an already-loaded actual series.
///
/// A missing `projected` target is estimated from the month-to-date run-rate.
pub fn run_projection(
    actual: Vec<ActualPoint>,
    budget: f64,
    projected: Option<f64>,
    accumulation: Accumulation,
) -> Result<RunOutput, ProjectionError> {
    let (target, is_run_rate) = match projected {
        Some(v) => (v, false),
        None => (run_rate_projection(&actual)?, true),
    };

    let merged = ProjectionMerger::new()
        .with_accumulation(accumulation)
        .merge(&actual, budget, target)?;
    let summary = summarize(&actual, &merged, budget, target, is_run_rate, accumulation)?;

    tracing::info!(
        points = merged.len(),
        budget,
        projected = target,
        status = summary.status.display_name(),
        "projection complete"
    );

    Ok(RunOutput {
        actual,
        merged,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::reference_series;
    use crate::domain::BudgetStatus;

    #[test]
    fn explicit_target_is_used_verbatim() {
        let run = run_projection(reference_series(), 20.0, Some(22.0), Accumulation::Iterative).unwrap();
        assert_eq!(run.merged.len(), 31);
        assert!(!run.summary.projected_is_run_rate);
        assert_eq!(run.summary.projected, 22.0);
    }

    #[test]
    fn missing_target_falls_back_to_run_rate() {
        let run = run_projection(reference_series(), 25.0, None, Accumulation::ClosedForm).unwrap();
        assert!(run.summary.projected_is_run_rate);
        assert!((run.summary.projected - 22.32).abs() < 1e-9);
        assert_eq!(run.summary.status, BudgetStatus::UnderBudget);
    }

    #[test]
    fn empty_series_surfaces_invalid_input() {
        let err = run_projection(Vec::new(), 20.0, Some(22.0), Accumulation::Iterative).unwrap_err();
        assert!(matches!(err, ProjectionError::InvalidInput(_)));
    }
}
