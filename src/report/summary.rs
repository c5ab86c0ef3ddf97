//! Headline KPI figures for a merged series.

use crate::domain::{Accumulation, ActualPoint, BudgetStatus, KpiSummary, MergedPoint};
use crate::error::ProjectionError;
use crate::projection::{daily_increment, days_remaining};

/// Projected totals within this fraction of budget count as on budget.
const ON_BUDGET_TOLERANCE: f64 = 0.005;

pub fn summarize(
    actual: &[ActualPoint],
    merged: &[MergedPoint],
    budget: f64,
    projected: f64,
    projected_is_run_rate: bool,
    accumulation: Accumulation,
) -> Result<KpiSummary, ProjectionError> {
    let last = actual
        .last()
        .ok_or_else(|| ProjectionError::invalid("actual series is empty"))?;
    let (period_start, period_end) = match (merged.first(), merged.last()) {
        (Some(first), Some(end)) => (first.date, end.date),
        _ => return Err(ProjectionError::invalid("merged series is empty")),
    };

    let remaining = days_remaining(last.date)
        .ok_or_else(|| ProjectionError::invalid(format!("no month end for {}", last.date)))?;
    let elapsed = (last.date - period_start).num_days() + 1;
    let variance = projected - budget;
    let variance_pct = (budget != 0.0).then(|| variance / budget.abs() * 100.0);

    Ok(KpiSummary {
        period_start,
        period_end,
        last_actual_date: last.date,
        last_actual: last.value,
        days_elapsed: elapsed,
        days_remaining: remaining,
        daily_increment: daily_increment(last.value, projected, remaining),
        budget,
        projected,
        projected_is_run_rate,
        variance,
        variance_pct,
        status: classify(budget, projected),
        accumulation,
    })
}

pub fn classify(budget: f64, projected: f64) -> BudgetStatus {
    let tolerance = budget.abs() * ON_BUDGET_TOLERANCE;
    if (projected - budget).abs() <= tolerance {
        BudgetStatus::OnBudget
    } else if projected < budget {
        BudgetStatus::UnderBudget
    } else {
        BudgetStatus::OverBudget
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::data::reference_series;
    use crate::projection::merge;

    #[test]
    fn reference_summary() {
        let actual = reference_series();
        let merged = merge(&actual, 20.0, 22.0).unwrap();
        let s = summarize(&actual, &merged, 20.0, 22.0, false, Accumulation::Iterative).unwrap();

        assert_eq!(s.period_start.to_string(), "2025-03-01");
        assert_eq!(s.period_end.to_string(), "2025-03-31");
        assert_eq!(s.days_elapsed, 15);
        assert_eq!(s.days_remaining, 16);
        assert!((s.daily_increment.unwrap() - 0.7).abs() < 1e-12);
        assert!((s.variance - 2.0).abs() < 1e-12);
        assert!((s.variance_pct.unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(s.status, BudgetStatus::OverBudget);
    }

    #[test]
    fn elapsed_days_count_calendar_days_across_months() {
        let actual: Vec<ActualPoint> = NaiveDate::from_ymd_opt(2025, 1, 30)
            .unwrap()
            .iter_days()
            .take(4)
            .zip([1.0, 1.5, 2.0, 2.5])
            .map(|(date, value)| ActualPoint::new(date, value))
            .collect();
        let merged = merge(&actual, 5.0, 9.0).unwrap();
        let s = summarize(&actual, &merged, 5.0, 9.0, false, Accumulation::ClosedForm).unwrap();

        assert_eq!(s.period_start.to_string(), "2025-01-30");
        assert_eq!(s.period_end.to_string(), "2025-02-28");
        assert_eq!(s.days_elapsed, 4);
        assert_eq!(s.days_remaining, 26);
        assert!((s.daily_increment.unwrap() - 6.5 / 26.0).abs() < 1e-12);
    }

    #[test]
    fn classify_bands() {
        assert_eq!(classify(100.0, 100.4), BudgetStatus::OnBudget);
        assert_eq!(classify(100.0, 99.6), BudgetStatus::OnBudget);
        assert_eq!(classify(100.0, 98.0), BudgetStatus::UnderBudget);
        assert_eq!(classify(100.0, 101.0), BudgetStatus::OverBudget);
        assert_eq!(classify(0.0, 0.0), BudgetStatus::OnBudget);
    }

    #[test]
    fn zero_budget_has_no_percentage() {
        let actual = reference_series();
        let merged = merge(&actual, 0.0, 22.0).unwrap();
        let s = summarize(&actual, &merged, 0.0, 22.0, false, Accumulation::Iterative).unwrap();
        assert_eq!(s.variance_pct, None);
        assert_eq!(s.status, BudgetStatus::OverBudget);
    }
}
