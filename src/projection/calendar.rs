//! Calendar-month period helpers.

use chrono::{Datelike, NaiveDate};

/// Last calendar day of the month containing `date`.
pub fn last_day_of_month(date: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)?.pred_opt()
}

pub fn days_in_month(date: NaiveDate) -> Option<u32> {
    last_day_of_month(date).map(|d| d.day())
}

/// Calendar days left in the month after `date` (0 on the last day).
pub fn days_remaining(date: NaiveDate) -> Option<i64> {
    let total = days_in_month(date)?;
    Some(i64::from(total - date.day()))
}
