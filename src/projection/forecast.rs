//! Period-end estimate when no target is supplied.

use chrono::Datelike;

use crate::domain::ActualPoint;
use crate::error::ProjectionError;
use crate::projection::calendar::days_in_month;

/// Straight run-rate: the last cumulative value scaled from elapsed days to the
/// full month.
pub fn run_rate_projection(actual: &[ActualPoint]) -> Result<f64, ProjectionError> {
    let last = actual
        .last()
        .ok_or_else(|| ProjectionError::invalid("actual series is empty"))?;
    if !last.value.is_finite() {
        return Err(ProjectionError::invalid(format!(
            "actual value on {} must be finite, got {}",
            last.date, last.value
        )));
    }

    let total = days_in_month(last.date)
        .ok_or_else(|| ProjectionError::invalid(format!("no month end for {}", last.date)))?;
    let elapsed = last.date.day();

    Ok(last.value / f64::from(elapsed) * f64::from(total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn reference_run_rate() {
        let actual = crate::data::reference_series();
        let p = run_rate_projection(&actual).unwrap();
        assert!((p - 10.8 / 15.0 * 31.0).abs() < 1e-12, "got {p}");
    }

    #[test]
    fn month_end_run_rate_is_last_value() {
        let date = NaiveDate::from_ymd_opt(2025, 4, 30).unwrap();
        let p = run_rate_projection(&[ActualPoint::new(date, 42.0)]).unwrap();
        assert!((p - 42.0).abs() < 1e-12);
    }

    #[test]
    fn empty_is_invalid() {
        assert!(matches!(
            run_rate_projection(&[]),
            Err(ProjectionError::InvalidInput(_))
        ));
    }
}
