//! Actual-series sample sources: the fixed reference month and a seeded
//! synthetic generator.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use chrono::{Datelike, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{ActualPoint, SampleConfig, SampleKind};
use crate::error::AppError;
use crate::projection::calendar::days_in_month;

/// Cumulative freight spend ($M) for 2025-03-01 ..= 2025-03-15.
const REFERENCE_VALUES: [f64; 15] = [
    1.2, 1.9, 2.6, 3.2, 3.9, 4.6, 5.3, 5.9, 6.6, 7.3, 8.0, 8.7, 9.4, 10.1, 10.8,
];

/// The dashboard's mock freight-spend month: 15 elapsed days of March 2025.
pub fn reference_series() -> Vec<ActualPoint> {
    let start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap_or_default();
    start
        .iter_days()
        .zip(REFERENCE_VALUES)
        .map(|(date, value)| ActualPoint::new(date, value))
        .collect()
}

/// Produce the actual series described by `config`.
pub fn generate_sample(config: &SampleConfig) -> Result<Vec<ActualPoint>, AppError> {
    match config.kind {
        SampleKind::Reference => Ok(reference_series()),
        SampleKind::Synthetic => generate_synthetic(config),
    }
}

fn generate_synthetic(config: &SampleConfig) -> Result<Vec<ActualPoint>, AppError> {
    if config.elapsed_days == 0 {
        return Err(AppError::new(2, "Elapsed days must be > 0."));
    }
    let month_len = days_in_month(config.start)
        .ok_or_else(|| AppError::new(2, format!("No month end for {}.", config.start)))?;
    let room = (month_len - config.start.day() + 1) as usize;
    if config.elapsed_days > room {
        return Err(AppError::new(
            2,
            format!(
                "Elapsed days ({}) run past the end of the month starting {} ({} days left).",
                config.elapsed_days, config.start, room
            ),
        ));
    }
    if !(config.daily_mean.is_finite() && config.daily_mean >= 0.0) {
        return Err(AppError::new(2, "Daily mean must be finite and >= 0."));
    }
    if !(config.daily_sigma.is_finite() && config.daily_sigma >= 0.0) {
        return Err(AppError::new(2, "Daily sigma must be finite and >= 0."));
    }

    let mut rng = StdRng::seed_from_u64(sample_seed(config));
    let normal = Normal::new(config.daily_mean, config.daily_sigma)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let mut running = 0.0_f64;
    let mut out = Vec::with_capacity(config.elapsed_days);
    for date in config.start.iter_days().take(config.elapsed_days) {
        // Spend never reverses within the month.
        running += normal.sample(&mut rng).max(0.0);
        out.push(ActualPoint::new(date, running));
    }

    tracing::debug!(
        points = out.len(),
        seed = config.seed,
        start = %config.start,
        "generated synthetic actual series"
    );

    Ok(out)
}

fn sample_seed(config: &SampleConfig) -> u64 {
    let mut hasher = DefaultHasher::new();
    config.start.hash(&mut hasher);
    config.elapsed_days.hash(&mut hasher);
    config.seed.hash(&mut hasher);
    config.daily_mean.to_bits().hash(&mut hasher);
    config.daily_sigma.to_bits().hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthetic(seed: u64, elapsed_days: usize) -> SampleConfig {
        SampleConfig {
            kind: SampleKind::Synthetic,
            start: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            elapsed_days,
            seed,
            daily_mean: 0.7,
            daily_sigma: 0.2,
        }
    }

    #[test]
    fn reference_series_matches_mock_month() {
        let s = reference_series();
        assert_eq!(s.len(), 15);
        assert_eq!(s[0].date, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(s[0].value, 1.2);
        assert_eq!(s[14].date, NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());
        assert_eq!(s[14].value, 10.8);
    }

    #[test]
    fn synthetic_is_deterministic_per_seed() {
        let a = generate_sample(&synthetic(7, 10)).unwrap();
        let b = generate_sample(&synthetic(7, 10)).unwrap();
        let c = generate_sample(&synthetic(8, 10)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn synthetic_is_cumulative_and_daily() {
        let s = generate_sample(&synthetic(42, 20)).unwrap();
        assert_eq!(s.len(), 20);
        for w in s.windows(2) {
            assert_eq!(w[0].date.succ_opt(), Some(w[1].date));
            assert!(w[1].value >= w[0].value);
        }
    }

    #[test]
    fn synthetic_may_fill_the_whole_month() {
        let s = generate_sample(&synthetic(1, 31)).unwrap();
        assert_eq!(s.last().unwrap().date, NaiveDate::from_ymd_opt(2025, 3, 31).unwrap());
        assert!(generate_sample(&synthetic(1, 32)).is_err());
    }

    #[test]
    fn synthetic_rejects_bad_settings() {
        assert!(generate_sample(&synthetic(1, 0)).is_err());

        let mut cfg = synthetic(1, 5);
        cfg.daily_sigma = -1.0;
        assert_eq!(generate_sample(&cfg).unwrap_err().exit_code(), 2);
    }
}
