//! Budget / actual / projected series merge.
//!
//! Given the realized daily values for the current period, a constant budget and
//! a period-end target, build one date-ordered series with three channels:
//!
//! - `actual`: the input values, unchanged
//! - `budget`: the constant, on every calendar day through month end
//! - `projected`: a straight line from the last actual value to the target,
//!   one point per remaining day of the month
//!
//! The last actual day also carries `projected` (set to the actual value) when a
//! projected segment follows it, so the two lines join on the chart.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{Accumulation, ActualPoint, MergedPoint};
use crate::error::ProjectionError;
use crate::projection::calendar::{days_remaining, last_day_of_month};

/// Builds merged chart series.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectionMerger {
    accumulation: Accumulation,
}

impl ProjectionMerger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_accumulation(mut self, accumulation: Accumulation) -> Self {
        self.accumulation = accumulation;
        self
    }

    /// Merge `actual` with the budget line and the projection to month end.
    ///
    /// `actual` must be non-empty, one point per consecutive calendar day, with
    /// finite values.
    /// A series that already ends on the last day of its month yields no projected
    /// points.
    pub fn merge(
        &self,
        actual: &[ActualPoint],
        budget: f64,
        projected: f64,
    ) -> Result<Vec<MergedPoint>, ProjectionError> {
        let (first, last) = match (actual.first(), actual.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return Err(ProjectionError::invalid("actual series is empty")),
        };
        if !budget.is_finite() {
            return Err(ProjectionError::invalid(format!(
                "budget value must be finite, got {budget}"
            )));
        }
        if !projected.is_finite() {
            return Err(ProjectionError::invalid(format!(
                "projected value must be finite, got {projected}"
            )));
        }
        validate_actuals(actual)?;

        let (period_end, remaining) = match (last_day_of_month(last.date), days_remaining(last.date)) {
            (Some(end), Some(remaining)) => (end, remaining),
            _ => {
                return Err(ProjectionError::invalid(format!(
                    "no month end for {}",
                    last.date
                )));
            }
        };
        let forward = project_forward(last, remaining, projected, self.accumulation);

        let mut by_date: BTreeMap<NaiveDate, MergedPoint> = first
            .date
            .iter_days()
            .take_while(|day| *day <= period_end)
            .map(|day| (day, MergedPoint::budget_only(day, budget)))
            .collect();

        for p in actual {
            if let Some(slot) = by_date.get_mut(&p.date) {
                slot.actual = Some(p.value);
            }
        }
        if !forward.is_empty() {
            if let Some(anchor) = by_date.get_mut(&last.date) {
                anchor.projected = Some(last.value);
            }
        }
        for (date, value) in &forward {
            if let Some(slot) = by_date.get_mut(date) {
                slot.projected = Some(*value);
            }
        }

        tracing::debug!(
            actual = actual.len(),
            projected = forward.len(),
            total = by_date.len(),
            %period_end,
            "merged projection series"
        );

        Ok(by_date.into_values().collect())
    }
}

/// Merge with the default (iterative) accumulation.
pub fn merge(
    actual: &[ActualPoint],
    budget: f64,
    projected: f64,
) -> Result<Vec<MergedPoint>, ProjectionError> {
    ProjectionMerger::new().merge(actual, budget, projected)
}

/// Per-day step from `last_value` to `target`; `None` when no days remain.
pub fn daily_increment(last_value: f64, target: f64, days_remaining: i64) -> Option<f64> {
    (days_remaining > 0).then(|| (target - last_value) / days_remaining as f64)
}

fn validate_actuals(actual: &[ActualPoint]) -> Result<(), ProjectionError> {
    for p in actual {
        if !p.value.is_finite() {
            return Err(ProjectionError::invalid(format!(
                "actual value on {} must be finite, got {}",
                p.date, p.value
            )));
        }
    }
    for w in actual.windows(2) {
        if w[1].date <= w[0].date {
            return Err(ProjectionError::invalid(format!(
                "actual dates must be strictly increasing ({} then {})",
                w[0].date, w[1].date
            )));
        }
        if w[0].date.succ_opt() != Some(w[1].date) {
            return Err(ProjectionError::invalid(format!(
                "actual series skips days between {} and {}",
                w[0].date, w[1].date
            )));
        }
    }
    Ok(())
}

fn project_forward(
    last: ActualPoint,
    days_remaining: i64,
    target: f64,
    accumulation: Accumulation,
) -> Vec<(NaiveDate, f64)> {
    let Some(increment) = daily_increment(last.value, target, days_remaining) else {
        return Vec::new();
    };

    let n = days_remaining as usize;
    let mut out = Vec::with_capacity(n);
    let mut running = last.value;
    for (i, date) in last.date.iter_days().skip(1).take(n).enumerate() {
        let value = match accumulation {
            Accumulation::Iterative => {
                running += increment;
                running
            }
            Accumulation::ClosedForm => last.value + (i + 1) as f64 * increment,
        };
        out.push((date, value));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::reference_series;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn daily(start: NaiveDate, values: &[f64]) -> Vec<ActualPoint> {
        start
            .iter_days()
            .zip(values.iter())
            .map(|(date, &value)| ActualPoint::new(date, value))
            .collect()
    }

    fn rel_close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * b.abs().max(1.0)
    }

    #[test]
    fn reference_scenario_fills_march() {
        let actual = reference_series();
        assert_eq!(actual.len(), 15);

        let merged = merge(&actual, 20.0, 22.0).unwrap();
        assert_eq!(merged.len(), 31);
        assert_eq!(merged[0].date, d(2025, 3, 1));

        let last = merged.last().unwrap();
        assert_eq!(last.date, d(2025, 3, 31));
        assert_eq!(last.budget, Some(20.0));
        assert_eq!(last.actual, None);
        assert!(rel_close(last.projected.unwrap(), 22.0), "got {:?}", last.projected);
    }

    #[test]
    fn length_is_actual_plus_remaining_days() {
        let actual = daily(d(2025, 4, 1), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        let merged = merge(&actual, 50.0, 30.0).unwrap();
        assert_eq!(merged.len(), 7 + 23);
    }

    #[test]
    fn every_point_carries_budget() {
        let actual = reference_series();
        let merged = merge(&actual, -3.5, 22.0).unwrap();
        assert!(merged.iter().all(|p| p.budget == Some(-3.5)));
    }

    #[test]
    fn output_sorted_with_unique_dates() {
        let actual = reference_series();
        let merged = merge(&actual, 20.0, 22.0).unwrap();
        for w in merged.windows(2) {
            assert!(w[0].date < w[1].date, "{} !< {}", w[0].date, w[1].date);
        }
    }

    #[test]
    fn actual_and_projected_only_overlap_on_anchor() {
        let actual = reference_series();
        let merged = merge(&actual, 20.0, 22.0).unwrap();
        let anchor = d(2025, 3, 15);

        for p in &merged {
            if p.date == anchor {
                assert_eq!(p.actual, Some(10.8));
                assert_eq!(p.projected, Some(10.8));
            } else {
                assert!(
                    p.actual.is_some() ^ p.projected.is_some(),
                    "{} has actual={:?} projected={:?}",
                    p.date,
                    p.actual,
                    p.projected
                );
            }
        }
    }

    #[test]
    fn month_end_series_has_no_projection() {
        let values: Vec<f64> = (1..=30).map(|i| i as f64).collect();
        let actual = daily(d(2025, 4, 1), &values);
        assert_eq!(actual.last().unwrap().date, d(2025, 4, 30));

        let merged = merge(&actual, 25.0, 99.0).unwrap();
        assert_eq!(merged.len(), actual.len());
        assert!(merged.iter().all(|p| p.projected.is_none()));
        assert!(merged.iter().all(|p| p.budget == Some(25.0)));
    }

    #[test]
    fn last_projection_hits_target_in_both_modes() {
        let actual = reference_series();
        for mode in [Accumulation::Iterative, Accumulation::ClosedForm] {
            let merged = ProjectionMerger::new()
                .with_accumulation(mode)
                .merge(&actual, 20.0, 22.0)
                .unwrap();
            let end = merged.last().unwrap().projected.unwrap();
            assert!(rel_close(end, 22.0), "{mode:?}: {end}");
        }
    }

    #[test]
    fn iterative_accumulates_step_by_step() {
        let actual = daily(d(2025, 2, 25), &[1.0]);
        let merged = merge(&actual, 0.0, 1.3).unwrap();
        let inc = (1.3 - 1.0) / 3.0;

        let mut running = 1.0;
        for p in &merged[1..] {
            running += inc;
            assert_eq!(p.projected, Some(running));
        }
    }

    #[test]
    fn empty_series_is_invalid_input() {
        let err = merge(&[], 20.0, 22.0).unwrap_err();
        assert!(matches!(err, ProjectionError::InvalidInput(_)));
    }

    #[test]
    fn non_finite_scalars_are_invalid_input() {
        let actual = reference_series();
        for (budget, projected) in [(f64::NAN, 1.0), (1.0, f64::INFINITY), (f64::NEG_INFINITY, 1.0)] {
            let err = merge(&actual, budget, projected).unwrap_err();
            assert!(matches!(err, ProjectionError::InvalidInput(_)));
        }
    }

    #[test]
    fn unordered_or_duplicate_dates_are_rejected() {
        let a = ActualPoint::new(d(2025, 3, 2), 1.0);
        let b = ActualPoint::new(d(2025, 3, 1), 2.0);
        assert!(merge(&[a, b], 1.0, 1.0).is_err());
        assert!(merge(&[a, a], 1.0, 1.0).is_err());
    }

    #[test]
    fn skipped_days_are_invalid_input() {
        let actual = vec![
            ActualPoint::new(d(2025, 1, 30), 1.0),
            ActualPoint::new(d(2025, 2, 2), 2.0),
        ];
        let err = merge(&actual, 5.0, 9.0).unwrap_err();
        assert!(matches!(err, ProjectionError::InvalidInput(_)));
        assert!(err.to_string().contains("skips days"), "{err}");
    }

    #[test]
    fn series_may_cross_a_month_boundary() {
        let actual = daily(d(2025, 1, 30), &[1.0, 1.5, 2.0, 2.5]);
        assert_eq!(actual.last().unwrap().date, d(2025, 2, 2));

        let merged = merge(&actual, 5.0, 9.0).unwrap();
        assert_eq!(merged.len(), 4 + 26);
        assert_eq!(merged[0].date, d(2025, 1, 30));
        assert_eq!(merged.last().unwrap().date, d(2025, 2, 28));
        assert!(merged.iter().all(|p| p.budget == Some(5.0)));

        let anchor = d(2025, 2, 2);
        for p in &merged {
            if p.date == anchor {
                assert_eq!((p.actual, p.projected), (Some(2.5), Some(2.5)));
            } else {
                assert!(p.actual.is_some() ^ p.projected.is_some(), "{}", p.date);
            }
        }
        assert!(rel_close(merged.last().unwrap().projected.unwrap(), 9.0));
    }

    #[test]
    fn inputs_are_left_untouched() {
        let actual = reference_series();
        let before = actual.clone();
        let _ = merge(&actual, 20.0, 22.0).unwrap();
        assert_eq!(actual, before);
    }

    #[test]
    fn daily_increment_guards_zero_days() {
        assert_eq!(daily_increment(10.0, 12.0, 0), None);
        assert_eq!(daily_increment(10.0, 12.0, 4), Some(0.5));
    }
}
